//! # Repository Management
//!
//! This module provides the `RepositoryManager`, which turns the repository
//! sources of a project configuration into a loaded [`Registry`]. Local
//! sources are read in place; Git sources are cloned into a cache directory
//! by `lbuild init`, refreshed by `lbuild update` and read from the cache by
//! every other command.
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait so tests can replace
//! the system `git` command with an in-process fake. `DefaultGitOperations`
//! wraps the functions in [`crate::git`].

use std::path::{Path, PathBuf};

use log::info;

use crate::config::{ProjectConfig, RepositorySource};
use crate::definition::load_repository;
use crate::error::{Error, Result};
use crate::git;
use crate::registry::Registry;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Shallow clone of `url` at `ref_name` into `target_dir`.
    fn clone_shallow(&self, url: &str, ref_name: &str, target_dir: &Path) -> Result<()>;

    /// Update an existing checkout to the head of `ref_name`.
    fn fetch(&self, url: &str, ref_name: &str, checkout: &Path) -> Result<()>;
}

/// Git operations backed by the system `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_shallow(&self, url: &str, ref_name: &str, target_dir: &Path) -> Result<()> {
        git::clone_shallow(url, ref_name, target_dir)
    }

    fn fetch(&self, url: &str, ref_name: &str, checkout: &Path) -> Result<()> {
        git::fetch(url, ref_name, checkout)
    }
}

/// Outcome of fetching one remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Cloned,
    Updated,
    /// Already cached; `init` leaves it alone.
    Cached,
}

/// Locates, fetches and loads repository definitions.
pub struct RepositoryManager {
    cache_root: PathBuf,
    git_ops: Box<dyn GitOperations>,
}

impl RepositoryManager {
    pub fn new(cache_root: PathBuf) -> Self {
        Self::with_operations(cache_root, Box::new(DefaultGitOperations))
    }

    /// Manager with custom git operations.
    pub fn with_operations(cache_root: PathBuf, git_ops: Box<dyn GitOperations>) -> Self {
        Self {
            cache_root,
            git_ops,
        }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn checkout_path(&self, url: &str, ref_name: &str) -> PathBuf {
        git::url_to_cache_path(&self.cache_root, url, ref_name)
    }

    /// Whether a source can be loaded without fetching. Local sources always
    /// can.
    pub fn is_available(&self, source: &RepositorySource) -> bool {
        match source {
            RepositorySource::Local { .. } => true,
            RepositorySource::Git { git, r#ref, .. } => self.checkout_path(git, r#ref).exists(),
        }
    }

    /// Remote sources of `config` that still need `lbuild init`.
    pub fn missing<'c>(&self, config: &'c ProjectConfig) -> Vec<&'c RepositorySource> {
        config
            .repositories
            .iter()
            .filter(|source| !self.is_available(source))
            .collect()
    }

    /// Path of the definition file of `source`.
    pub fn definition_path(&self, source: &RepositorySource, config: &ProjectConfig) -> PathBuf {
        match source {
            RepositorySource::Local { path } => config.resolve_path(path),
            RepositorySource::Git { git, r#ref, file } => self.checkout_path(git, r#ref).join(file),
        }
    }

    /// Clone a remote source unless it is cached, or refresh it when
    /// `update` is set. Local sources are left alone.
    pub fn fetch(&self, source: &RepositorySource, update: bool) -> Result<Option<FetchStatus>> {
        let (url, ref_name) = match source {
            RepositorySource::Local { .. } => return Ok(None),
            RepositorySource::Git { git, r#ref, .. } => (git.as_str(), r#ref.as_str()),
        };
        let checkout = self.checkout_path(url, ref_name);
        let status = if !checkout.exists() {
            self.git_ops.clone_shallow(url, ref_name, &checkout)?;
            FetchStatus::Cloned
        } else if update {
            self.git_ops.fetch(url, ref_name, &checkout)?;
            FetchStatus::Updated
        } else {
            FetchStatus::Cached
        };
        info!("{}@{}: {:?}", url, ref_name, status);
        Ok(Some(status))
    }

    /// Load every repository of `config` plus the definition files in
    /// `extra` into a registry.
    pub fn load_registry(&self, config: &ProjectConfig, extra: &[PathBuf]) -> Result<Registry> {
        let mut registry = Registry::new();
        for source in &config.repositories {
            if let RepositorySource::Git { git, r#ref, .. } = source {
                if !self.is_available(source) {
                    return Err(Error::Repository {
                        name: format!("{}@{}", git, r#ref),
                        message: "repository has not been fetched".to_string(),
                        hint: Some("Run 'lbuild init' to fetch remote repositories".to_string()),
                    });
                }
            }
            registry.add_repository(load_repository(&self.definition_path(source, config))?)?;
        }
        for path in extra {
            registry.add_repository(load_repository(path)?)?;
        }
        Ok(registry)
    }
}
