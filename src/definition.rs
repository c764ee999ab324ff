//! # Declarative Repository Definitions
//!
//! Repositories can be described in YAML instead of code. A `repo.yaml`
//! names the repository, declares its options and lists glob patterns for
//! the module definition files below it:
//!
//! ```yaml
//! name: repo1
//! description: Drivers for the demo board
//! options:
//!   - name: target
//!     type: enumeration
//!     values: [hosted, stm32]
//!     default: hosted
//! modules:
//!   - "src/**/module.yaml"
//! ```
//!
//! Each `module.yaml` is turned into a [`DeclarativeModule`]:
//!
//! ```yaml
//! name: gpio
//! parent: platform
//! description: GPIO driver
//! options:
//!   - name: pins
//!     type: numeric
//!     minimum: 1
//!     maximum: 64
//!     default: 16
//! depends: [":platform"]
//! available:
//!   option: target
//!   in: [stm32]
//! files:
//!   - template: gpio.hpp.in
//!     dest: src/gpio.hpp
//!   - copy: LICENSE
//! ```
//!
//! Template sources and copied files are resolved against the directory of
//! the `module.yaml`. Without `dest`, a file keeps its source path, minus a
//! trailing `.in` for templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};
use serde::Deserialize;

use crate::config::Scalar;
use crate::defaults::MODULE_FILENAME;
use crate::error::{Error, Result};
use crate::module::{BuildEnv, Module, ModuleInit, ModulePrepare};
use crate::option::{ConfigOption, OptionScope};
use crate::path::glob_match;
use crate::registry::{Repository, RepositoryBuilder};

/// Suffix stripped from template sources when no destination is given.
const TEMPLATE_SUFFIX: &str = ".in";

fn default_module_globs() -> Vec<String> {
    vec![format!("**/{}", MODULE_FILENAME)]
}

/// Content of a `repo.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    /// Glob patterns, relative to the repository directory.
    #[serde(default = "default_module_globs")]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    String,
    Boolean,
    Numeric,
    Enumeration,
}

/// One declared option.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Option<Scalar>,
    #[serde(default)]
    pub minimum: Option<Scalar>,
    #[serde(default)]
    pub maximum: Option<Scalar>,
    #[serde(default)]
    pub values: Vec<Scalar>,
}

impl OptionDefinition {
    pub fn to_option(&self) -> Result<ConfigOption> {
        let option = match self.kind {
            OptionKind::String => ConfigOption::string(&self.name, &self.description)?,
            OptionKind::Boolean => ConfigOption::boolean(&self.name, &self.description)?,
            OptionKind::Numeric => ConfigOption::numeric(
                &self.name,
                &self.description,
                self.bound("minimum", self.minimum.as_ref())?,
                self.bound("maximum", self.maximum.as_ref())?,
            )?,
            OptionKind::Enumeration => ConfigOption::enumeration(
                &self.name,
                &self.description,
                self.values.iter().map(Scalar::to_string),
            )?,
        };
        match &self.default {
            Some(default) => option.with_default(&default.to_string()),
            None => Ok(option),
        }
    }

    fn bound(&self, key: &str, value: Option<&Scalar>) -> Result<Option<i64>> {
        match value {
            None => Ok(None),
            Some(Scalar::Integer(bound)) => Ok(Some(*bound)),
            Some(Scalar::String(raw)) => crate::option::value::parse_integer(raw)
                .map(Some)
                .ok_or_else(|| {
                    Error::format(&self.name, format!("{} '{}' is not an integer", key, raw))
                }),
            Some(other) => Err(Error::format(
                &self.name,
                format!("{} '{}' is not an integer", key, other),
            )),
        }
    }
}

/// Availability condition over resolved repository options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Equals {
        option: String,
        equals: Scalar,
    },
    OneOf {
        option: String,
        #[serde(rename = "in")]
        values: Vec<Scalar>,
    },
    All {
        all: Vec<Condition>,
    },
    Any {
        any: Vec<Condition>,
    },
    Not {
        not: Box<Condition>,
    },
}

impl Condition {
    /// Evaluate against the options visible from a repository.
    ///
    /// Expected values are parsed by the referenced option, so `0x10` equals
    /// a numeric value of 16 and `yes` equals `true`.
    pub fn evaluate(&self, options: &OptionScope<'_>) -> Result<bool> {
        match self {
            Condition::Equals { option, equals } => {
                Self::compare(options, option, std::slice::from_ref(equals))
            }
            Condition::OneOf { option, values } => Self::compare(options, option, values),
            Condition::All { all } => {
                for condition in all {
                    if !condition.evaluate(options)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any { any } => {
                for condition in any {
                    if condition.evaluate(options)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not { not } => Ok(!not.evaluate(options)?),
        }
    }

    fn compare(options: &OptionScope<'_>, name: &str, expected: &[Scalar]) -> Result<bool> {
        let value = options.require(name)?;
        if let Some(option) = options.get(name) {
            for candidate in expected {
                if option.parse_value(&candidate.to_string())? == *value {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// A file produced by a declarative module.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileRule {
    Template {
        template: String,
        #[serde(default)]
        dest: Option<String>,
    },
    Copy {
        copy: String,
        #[serde(default)]
        dest: Option<String>,
    },
}

impl FileRule {
    /// Destination of the file relative to the output root.
    pub fn destination(&self) -> &str {
        match self {
            FileRule::Template {
                template,
                dest: None,
            } => template.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(template),
            FileRule::Copy { copy, dest: None } => copy.as_str(),
            FileRule::Template { dest: Some(dest), .. } | FileRule::Copy { dest: Some(dest), .. } => {
                dest.as_str()
            }
        }
    }
}

/// Content of a `module.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDefinition {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub available: Option<Condition>,
    #[serde(default)]
    pub files: Vec<FileRule>,
}

/// A module backed by a `module.yaml`.
#[derive(Debug, Clone)]
pub struct DeclarativeModule {
    origin: PathBuf,
    definition: ModuleDefinition,
}

impl DeclarativeModule {
    pub fn new(origin: impl Into<PathBuf>, definition: ModuleDefinition) -> Self {
        Self {
            origin: origin.into(),
            definition,
        }
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }

    fn origin(&self) -> String {
        self.origin.display().to_string()
    }
}

impl Module for DeclarativeModule {
    fn init(&self, module: &mut ModuleInit) -> Result<()> {
        module.name = self.definition.name.clone();
        module.parent = self.definition.parent.clone();
        module.description = self.definition.description.clone();
        Ok(())
    }

    fn prepare(&self, module: &mut ModulePrepare, options: &OptionScope<'_>) -> Result<bool> {
        for option in &self.definition.options {
            let option = option
                .to_option()
                .map_err(|e| Error::definition(self.origin(), e.to_string()))?;
            module.add_option(option);
        }
        for dependency in &self.definition.depends {
            module.depends(dependency.as_str());
        }
        match &self.definition.available {
            Some(condition) => condition
                .evaluate(options)
                .map_err(|e| Error::definition(self.origin(), e.to_string())),
            None => Ok(true),
        }
    }

    fn build(&self, env: &mut BuildEnv<'_>) -> Result<()> {
        for rule in &self.definition.files {
            match rule {
                FileRule::Template { template, .. } => env.template(template, rule.destination())?,
                FileRule::Copy { copy, .. } => env.copy(copy, rule.destination())?,
            }
        }
        Ok(())
    }
}

/// Parse a `repo.yaml`.
pub fn parse_repository(yaml_content: &str, origin: &str) -> Result<RepositoryDefinition> {
    serde_yaml::from_str(yaml_content).map_err(|e| Error::definition(origin, e.to_string()))
}

/// Parse a `module.yaml`.
pub fn parse_module(yaml_content: &str, origin: &str) -> Result<ModuleDefinition> {
    serde_yaml::from_str(yaml_content).map_err(|e| Error::definition(origin, e.to_string()))
}

/// Load a repository and all of its modules from a `repo.yaml`.
pub fn load_repository(path: &Path) -> Result<Repository> {
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| Error::Repository {
        name: origin.clone(),
        message: format!("cannot read repository definition: {}", e),
        hint: None,
    })?;
    let definition = parse_repository(&content, &origin)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));

    let mut builder =
        RepositoryBuilder::new(&definition.name, root).description(&definition.description);
    for option in &definition.options {
        let option = option
            .to_option()
            .map_err(|e| Error::definition(origin.as_str(), e.to_string()))?;
        builder.add_option(option);
    }

    for module_file in find_module_files(root, &definition.modules)? {
        let module_origin = module_file.display().to_string();
        let content = fs::read_to_string(&module_file)?;
        let module = parse_module(&content, &module_origin)?;
        trace!("Loaded module definition {}", module_origin);
        let directory = module_file.parent().unwrap_or(root).to_path_buf();
        builder.add_module(directory, Arc::new(DeclarativeModule::new(&module_file, module)));
    }

    let repository = builder.build()?;
    debug!(
        "Loaded repository {} from {} ({} module(s))",
        repository.name,
        origin,
        repository.modules.len()
    );
    Ok(repository)
}

/// Module definition files below `root` matching any of `globs`, in path
/// order. Hidden directories are skipped.
pub fn find_module_files(root: &Path, globs: &[String]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        for glob in globs {
            if glob_match(glob, &relative)? {
                found.push(entry.path().to_path_buf());
                break;
            }
        }
    }
    Ok(found)
}
