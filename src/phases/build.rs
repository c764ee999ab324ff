//! Phase 5: Building Modules
//!
//! Runs the build operation of every module in the build plan and collects
//! the generated files.
//!
//! ## Process
//!
//! 1.  **Value Check**: Every option visible to a module in the plan (its own
//!     options and its repository's options) must have a value.
//!
//! 2.  **Level Builds**: Modules of one dependency level are built in
//!     parallel, each into its own staging buffer. Levels run in order, so a
//!     module never starts before its dependencies finished.
//!
//! 3.  **Commit**: Staged files are committed to the build log and the
//!     in-memory output in (level, module name) order. The first error or
//!     output collision in that order fails the build, independent of which
//!     worker finished first.
//!
//! Nothing is written to disk here; see the write phase.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;

use super::availability::{AvailableModules, PreparedModule};
use super::dependencies::BuildPlan;
use crate::buildlog::{BuildLog, BuildLogEntry};
use crate::error::{Error, Result};
use crate::filesystem::{File, MemoryFS};
use crate::module::{BuildEnv, StagedFile};
use crate::option::{OptionScope, OptionSet};
use crate::path::absolute_root;
use crate::render::Renderer;

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    pub log: BuildLog,
    /// Generated files keyed by path relative to the output root.
    pub files: MemoryFS,
}

/// Inputs shared by every module build.
pub struct BuildContext<'a> {
    pub available: &'a AvailableModules,
    pub repo_options: &'a OptionSet,
    pub module_options: &'a OptionSet,
    pub outpath: &'a Path,
    pub renderer: &'a dyn Renderer,
}

impl<'a> BuildContext<'a> {
    fn scope(&self, module: &'a PreparedModule) -> OptionScope<'a> {
        OptionScope::module(
            &module.entry.fullname,
            &module.entry.repository,
            self.repo_options,
            self.module_options,
        )
    }

    fn prepared(&self, name: &str) -> Result<&'a PreparedModule> {
        self.available.get(name).ok_or_else(|| Error::UnresolvedDependency {
            module: name.to_string(),
            dependency: name.to_string(),
        })
    }
}

/// Build every module of `plan`.
pub fn execute(plan: &BuildPlan, context: &BuildContext<'_>) -> Result<BuildOutput> {
    check_values(plan, context)?;

    let outpath = absolute_root(context.outpath)?;
    let log = BuildLog::new(&outpath);
    let mut files = MemoryFS::new();

    for (index, level) in plan.levels.iter().enumerate() {
        debug!("Building level {}: {}", index, level.join(", "));
        let results: Vec<Result<Vec<StagedFile>>> = level
            .par_iter()
            .map(|name| build_module(name, &outpath, context))
            .collect();

        for (name, result) in level.iter().zip(results) {
            for staged in result? {
                log.add(BuildLogEntry {
                    path: staged.path,
                    module: name.clone(),
                    template: staged.template,
                })?;
                files.add_file(&staged.relative, File::new(staged.content, name))?;
            }
        }
    }

    info!("Built {} module(s), generated {} file(s)", plan.len(), files.len());
    Ok(BuildOutput { log, files })
}

fn check_values(plan: &BuildPlan, context: &BuildContext<'_>) -> Result<()> {
    for name in &plan.order {
        let module = context.prepared(name)?;
        for option in context.scope(module).visible() {
            if !option.is_set() {
                return Err(Error::MissingValue {
                    option: option.fullname(),
                    hint: Some(format!(
                        "Module '{}' needs it; set it in the configuration file or with -D {}=<value>",
                        name,
                        option.fullname()
                    )),
                });
            }
        }
    }
    Ok(())
}

fn build_module(name: &str, outpath: &Path, context: &BuildContext<'_>) -> Result<Vec<StagedFile>> {
    let module = context.prepared(name)?;
    let mut env = BuildEnv::new(
        &module.entry.fullname,
        &module.entry.path,
        outpath,
        context.scope(module),
        context.renderer,
    );
    module.entry.module.build(&mut env)?;
    let staged = env.into_staged();
    debug!("{} staged {} file(s)", name, staged.len());
    Ok(staged)
}
