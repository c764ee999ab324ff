//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `lbuild`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the global options and the parsed
//!   `Args` and performs the command's logic.
//!
//! [`Session`] gathers what every command needs from the global options: the
//! project configuration, the repository manager and the override layers.

pub mod build;
pub mod dependencies;
pub mod discover;
pub mod init;

use std::path::PathBuf;

use anyhow::{Context, Result};

use lbuild::buildlog::log_path;
use lbuild::config::ProjectConfig;
use lbuild::defaults::{default_cache_root, DEFAULT_CONFIG_FILENAME};
use lbuild::phases::options::{OptionOverride, OverrideLayer};
use lbuild::phases::orchestrator::{self, Resolution};
use lbuild::registry::Registry;
use lbuild::repository::RepositoryManager;
use lbuild::suggestions;

use crate::cli::GlobalArgs;

/// Inputs of one command invocation.
pub struct Session<'g> {
    pub global: &'g GlobalArgs,
    pub config: ProjectConfig,
    pub config_path: PathBuf,
    pub manager: RepositoryManager,
}

impl<'g> Session<'g> {
    /// Load the project configuration.
    ///
    /// Without `-c`, a missing `project.yaml` is tolerated when repositories
    /// are given with `-r`.
    pub fn open(global: &'g GlobalArgs) -> Result<Self> {
        let config_path = global
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));

        let config = if config_path.exists() {
            ProjectConfig::load(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?
        } else if global.config.is_none() && !global.repositories.is_empty() {
            ProjectConfig::default()
        } else {
            return Err(suggestions::config_not_found(&config_path));
        };

        let cache_root = global.cache_root.clone().unwrap_or_else(default_cache_root);
        Ok(Self {
            global,
            config,
            config_path,
            manager: RepositoryManager::new(cache_root),
        })
    }

    /// Load all repositories. Remote ones must have been fetched.
    pub fn registry(&self) -> Result<Registry> {
        if !self.manager.missing(&self.config).is_empty() {
            return Err(suggestions::repositories_not_initialized(
                self.manager.cache_root(),
            ));
        }
        Ok(self
            .manager
            .load_registry(&self.config, &self.global.repositories)?)
    }

    /// Override layers: the configuration file first, then `-D`.
    pub fn layers(&self) -> Result<Vec<OverrideLayer>> {
        let mut overrides = Vec::new();
        for definition in &self.global.options {
            if !definition.contains('=') {
                return Err(suggestions::malformed_define(definition));
            }
            overrides.push(OptionOverride::parse(definition)?);
        }
        Ok(vec![
            self.config.overrides()?,
            OverrideLayer::new("command line", overrides),
        ])
    }

    /// Load the registry and run phases 1 and 2.
    pub fn resolve(&self) -> Result<(Registry, Resolution)> {
        let registry = self.registry()?;
        let resolution = orchestrator::resolve(&registry, &self.layers()?)?;
        Ok((registry, resolution))
    }

    /// Module selectors: the configured ones followed by `modules`, without
    /// duplicates. Empty means every available module.
    pub fn selectors(&self, modules: &[String]) -> Vec<String> {
        let mut selectors: Vec<String> = Vec::new();
        for selector in self.config.modules.iter().chain(modules) {
            if !selectors.contains(selector) {
                selectors.push(selector.clone());
            }
        }
        selectors
    }

    /// The build log next to the loaded configuration file, if one was loaded.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.config
            .path
            .as_ref()
            .map(|_| log_path(&self.config_path))
    }
}
