//! # Entity Registry
//!
//! The [`Registry`] is the resolution context of one invocation: it owns
//! every loaded repository with its declared options and module definitions.
//! It is built once, then only read by the resolution phases.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::module::{Module, ModuleInit};
use crate::option::{validate_name, ConfigOption, OptionSet, Scope};
use crate::suggestions::find_similar;

/// A registered module, before availability filtering.
#[derive(Clone)]
pub struct ModuleEntry {
    /// `repo:module[:submodule...]`
    pub fullname: String,
    pub name: String,
    /// Fully-qualified name of the parent module.
    pub parent: Option<String>,
    pub repository: String,
    pub description: String,
    /// Directory the definition was loaded from; template sources are
    /// resolved against it.
    pub path: PathBuf,
    pub module: Arc<dyn Module>,
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("fullname", &self.fullname)
            .field("parent", &self.parent)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ModuleEntry {
    /// First paragraph of the description.
    pub fn short_description(&self) -> &str {
        self.description
            .split("\n\n")
            .next()
            .unwrap_or_default()
            .trim()
    }
}

/// A loaded repository.
#[derive(Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    /// Declared repository options with their defaults.
    pub options: OptionSet,
    /// Declared modules by fully-qualified name.
    pub modules: BTreeMap<String, ModuleEntry>,
}

/// Registration surface for one repository.
pub struct RepositoryBuilder {
    name: String,
    path: PathBuf,
    description: String,
    options: Vec<ConfigOption>,
    modules: Vec<(PathBuf, Arc<dyn Module>)>,
}

impl RepositoryBuilder {
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            description: String::new(),
            options: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn add_option(&mut self, option: ConfigOption) -> &mut Self {
        self.options.push(option);
        self
    }

    /// Register a module whose sources live in `path`.
    pub fn add_module(&mut self, path: impl Into<PathBuf>, module: Arc<dyn Module>) -> &mut Self {
        self.modules.push((path.into(), module));
        self
    }

    /// Validate the declarations and produce the repository.
    pub fn build(self) -> Result<Repository> {
        validate_name(&self.name)?;

        let mut options = OptionSet::new();
        for option in self.options {
            options.insert(option.with_scope(Scope::Repository(self.name.clone())))?;
        }

        let mut modules = BTreeMap::new();
        for (path, module) in self.modules {
            let mut init = ModuleInit::default();
            module.init(&mut init)?;
            validate_name(&init.name).map_err(|e| {
                Error::definition(path.display().to_string(), e.to_string())
            })?;

            let parent = match init.parent.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(parent) => Some(format!("{}:{}", self.name, parent)),
            };
            let fullname = match &parent {
                Some(parent) => format!("{}:{}", parent, init.name),
                None => format!("{}:{}", self.name, init.name),
            };
            if modules.contains_key(&fullname) {
                return Err(Error::definition(
                    fullname,
                    "module is declared more than once",
                ));
            }
            debug!("Registered module {}", fullname);
            modules.insert(
                fullname.clone(),
                ModuleEntry {
                    fullname,
                    name: init.name,
                    parent,
                    repository: self.name.clone(),
                    description: init.description,
                    path,
                    module,
                },
            );
        }

        for entry in modules.values() {
            if let Some(parent) = &entry.parent {
                if !modules.contains_key(parent) {
                    return Err(Error::definition(
                        entry.fullname.clone(),
                        format!("parent module '{}' does not exist", parent),
                    ));
                }
            }
        }

        Ok(Repository {
            name: self.name,
            path: self.path,
            description: self.description,
            options,
            modules,
        })
    }
}

/// All repositories loaded for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    repositories: BTreeMap<String, Repository>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repository(&mut self, repository: Repository) -> Result<()> {
        if let Some(existing) = self.repositories.get(&repository.name) {
            return Err(Error::Repository {
                name: repository.name.clone(),
                message: format!(
                    "repository name is used by both {} and {}",
                    existing.path.display(),
                    repository.path.display()
                ),
                hint: None,
            });
        }
        debug!(
            "Loaded repository {} with {} module(s)",
            repository.name,
            repository.modules.len()
        );
        self.repositories.insert(repository.name.clone(), repository);
        Ok(())
    }

    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.values()
    }

    pub fn repository(&self, name: &str) -> Result<&Repository> {
        self.repositories.get(name).ok_or_else(|| {
            let names: Vec<&str> = self.repositories.keys().map(String::as_str).collect();
            Error::Repository {
                name: name.to_string(),
                message: "repository is not loaded".to_string(),
                hint: find_similar(name, &names).map(|s| format!("Did you mean '{}'?", s)),
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Every declared module across all repositories, by full name.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.repositories
            .values()
            .flat_map(|repository| repository.modules.values())
    }

    pub fn module(&self, fullname: &str) -> Option<&ModuleEntry> {
        let (repository, _) = crate::pattern::split_repository(fullname);
        self.repositories
            .get(repository)
            .and_then(|r| r.modules.get(fullname))
    }

    /// Declared options of all repositories, with their defaults.
    pub fn repository_options(&self) -> OptionSet {
        self.repositories
            .values()
            .flat_map(|repository| repository.options.iter().cloned())
            .collect()
    }
}
