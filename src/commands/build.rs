//! # Build Command
//!
//! Runs the complete pipeline: resolves options and modules, builds the
//! selected modules with their dependencies, writes the generated files
//! below `-p/--path` and records them in the build log next to the project
//! configuration. Without a configuration file no build log is written.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use lbuild::phases::orchestrator::{self, BuildSettings};
use lbuild::render::SubstitutionRenderer;

use super::Session;
use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Module selector (repeatable), added to the configured modules; without
    /// any, all available modules are built
    #[arg(short, long = "module", value_name = "PATTERN")]
    pub modules: Vec<String>,

    /// Do not write the build log
    #[arg(long)]
    pub no_log: bool,

    /// Build in memory without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();
    let session = Session::open(global)?;
    if !args.no_log && session.log_path().is_none() {
        info!("No configuration file loaded; the build log is not written");
    }
    let registry = session.registry()?;
    let layers = session.layers()?;
    let selectors = session.selectors(&args.modules);

    let renderer = SubstitutionRenderer;
    let settings = BuildSettings {
        outpath: &global.path,
        renderer: &renderer,
        dry_run: args.dry_run,
        log_path: if args.no_log {
            None
        } else {
            session.log_path()
        },
    };
    let output = orchestrator::execute_build(&registry, &layers, &selectors, &settings)
        .context("Build failed")?;

    if args.dry_run {
        for (path, file) in output.files.files() {
            println!("{}  ({})", path.display(), file.module);
        }
        println!("Dry run: {} file(s) would be written", output.files.len());
    } else {
        println!(
            "Generated {} file(s) in {} ({:.2?})",
            output.files.len(),
            output.log.outpath().display(),
            start_time.elapsed()
        );
    }
    Ok(())
}
