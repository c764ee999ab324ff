//! # Init and Update Commands
//!
//! `init` clones every remote repository of the project configuration into
//! the cache, skipping the ones already there. `update` also refreshes the
//! cached checkouts. Local repositories are never touched.

use anyhow::{Context, Result};

use lbuild::config::RepositorySource;
use lbuild::repository::FetchStatus;

use super::Session;
use crate::cli::GlobalArgs;

/// Execute `init` (or `update` when `update` is set).
pub fn execute(global: &GlobalArgs, update: bool) -> Result<()> {
    let session = Session::open(global)?;
    let mut fetched = 0;

    for source in &session.config.repositories {
        let status = session
            .manager
            .fetch(source, update)
            .with_context(|| format!("Failed to fetch {}", describe(source)))?;
        match status {
            Some(FetchStatus::Cloned) => println!("Cloned {}", describe(source)),
            Some(FetchStatus::Updated) => println!("Updated {}", describe(source)),
            Some(FetchStatus::Cached) => println!("Up to date {}", describe(source)),
            None => continue,
        }
        fetched += 1;
    }

    if fetched == 0 {
        println!("No remote repositories configured");
    }
    Ok(())
}

fn describe(source: &RepositorySource) -> String {
    match source {
        RepositorySource::Git { git, r#ref, .. } => format!("{} @ {}", git, r#ref),
        RepositorySource::Local { path } => path.display().to_string(),
    }
}
