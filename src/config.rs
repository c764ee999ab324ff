//! # Project Configuration
//!
//! This module defines the `project.yaml` file that drives an lbuild
//! invocation and the logic for parsing it.
//!
//! ```yaml
//! repositories:
//!   - path: ../repo1/repo.yaml
//!   - git: https://example.com/lib.git
//!     ref: main
//!     file: repo.yaml
//! modules: ["repo1:other", ":module1"]
//! options:
//!   ":target": hosted
//!   "repo1:other:foo": 456
//! ```
//!
//! ## Key Components
//!
//! - **`ProjectConfig`**: the parsed file. Relative repository paths are
//!   resolved against the directory of the file.
//!
//! - **`RepositorySource`**: where a repository definition comes from, either
//!   a local `repo.yaml` or a Git remote fetched into the cache by
//!   `lbuild init`.
//!
//! - **`Scalar`**: an option value as written in YAML. Booleans and numbers
//!   are stringified before they are coerced by the addressed option.
//!
//! The `options` mapping becomes the first override layer; `-D` arguments on
//! the command line form a second layer applied after it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::phases::options::{OptionOverride, OverrideLayer};

/// A scalar YAML value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Integer(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::String(value) => f.write_str(value),
        }
    }
}

fn default_ref() -> String {
    "main".to_string()
}

fn default_definition_file() -> String {
    crate::defaults::REPOSITORY_FILENAME.to_string()
}

/// Location of a repository definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositorySource {
    /// A repository fetched from a Git remote.
    Git {
        git: String,
        #[serde(rename = "ref", default = "default_ref")]
        r#ref: String,
        /// Definition file inside the checkout.
        #[serde(default = "default_definition_file")]
        file: String,
    },
    /// A definition file on the local filesystem.
    Local { path: PathBuf },
}

/// The parsed project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub repositories: Vec<RepositorySource>,
    /// Module selectors built when none are given on the command line.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Option overrides keyed by pattern.
    #[serde(default)]
    pub options: BTreeMap<String, Scalar>,
    /// File the configuration was read from.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl ProjectConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = parse(&content)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."))
    }

    /// Resolve a path written in the configuration file.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// The `options` mapping as an override layer.
    pub fn overrides(&self) -> Result<OverrideLayer> {
        let overrides = self
            .options
            .iter()
            .map(|(pattern, value)| OptionOverride::new(pattern, &value.to_string()))
            .collect::<Result<Vec<_>>>()?;
        let origin = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "configuration".to_string());
        Ok(OverrideLayer::new(&origin, overrides))
    }
}

/// Parse the content of a configuration file.
pub fn parse(yaml_content: &str) -> Result<ProjectConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "The file accepts the keys 'repositories', 'modules' and 'options'".to_string(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_configuration() {
        let config = parse(
            r#"
repositories:
  - path: ../repo1/repo.yaml
  - git: https://example.com/lib.git
    ref: v2
modules: ["repo1:other", ":module1"]
options:
  ":target": hosted
  "repo1:other:foo": 456
  "repo1::debug": true
"#,
        )
        .unwrap();

        assert_eq!(
            config.repositories,
            vec![
                RepositorySource::Local {
                    path: PathBuf::from("../repo1/repo.yaml")
                },
                RepositorySource::Git {
                    git: "https://example.com/lib.git".to_string(),
                    r#ref: "v2".to_string(),
                    file: "repo.yaml".to_string(),
                },
            ]
        );
        assert_eq!(config.modules, vec!["repo1:other", ":module1"]);
        assert_eq!(config.options["repo1:other:foo"], Scalar::Integer(456));
        assert_eq!(config.options["repo1::debug"].to_string(), "true");
    }

    #[test]
    fn test_git_source_defaults() {
        let config = parse("repositories:\n  - git: https://example.com/lib.git\n").unwrap();
        match &config.repositories[0] {
            RepositorySource::Git { r#ref, file, .. } => {
                assert_eq!(r#ref, "main");
                assert_eq!(file, "repo.yaml");
            }
            other => panic!("Expected git source, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_empty_configuration() {
        assert_eq!(parse("").unwrap(), ProjectConfig::default());
        assert_eq!(parse("\n# nothing\n").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        match parse("module: [a]\n") {
            Err(Error::ConfigParse { hint, .. }) => assert!(hint.is_some()),
            other => panic!("Expected ConfigParse, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides_layer() {
        let config = parse("options:\n  \":target\": hosted\n  \"repo:gpio:pins\": 8\n").unwrap();
        let layer = config.overrides().unwrap();
        assert_eq!(layer.overrides.len(), 2);
        assert_eq!(layer.origin, "configuration");
    }

    #[test]
    fn test_override_with_short_pattern_is_rejected() {
        let config = parse("options:\n  target: hosted\n").unwrap();
        assert!(matches!(config.overrides(), Err(Error::Format { .. })));
    }

    #[test]
    fn test_resolve_path_against_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("project.yaml");
        fs::write(&path, "repositories:\n  - path: repo/repo.yaml\n").unwrap();
        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(
            config.resolve_path(Path::new("repo/repo.yaml")),
            dir.path().join("repo/repo.yaml")
        );
        assert_eq!(
            config.resolve_path(Path::new("/abs/repo.yaml")),
            PathBuf::from("/abs/repo.yaml")
        );
    }
}
