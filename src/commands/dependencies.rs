//! # Dependencies Command
//!
//! Prints the dependency graph of all available modules in Graphviz dot
//! format, or of the closure of `-m` selectors when given. Configured modules
//! do not narrow the graph. Pipe it into `dot -Tsvg` to render it.

use anyhow::Result;
use clap::Args;

use super::Session;
use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct DependenciesArgs {
    /// Module selector (repeatable); defaults to all available modules
    #[arg(short, long = "module", value_name = "PATTERN")]
    pub modules: Vec<String>,
}

pub fn execute(global: &GlobalArgs, args: DependenciesArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (_, resolution) = session.resolve()?;
    let plan = resolution.plan(&args.modules)?;
    print!("{}", plan.graphviz());
    Ok(())
}
