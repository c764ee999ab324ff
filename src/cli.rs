//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::commands;

/// lbuild - Resolve and generate modular code libraries
#[derive(Parser, Debug)]
#[command(name = "lbuild")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Repository definition file to load in addition to the configured ones
    #[arg(short = 'r', long = "repository", value_name = "FILE", global = true)]
    pub repositories: Vec<PathBuf>,

    /// Project configuration file [default: project.yaml]
    #[arg(short, long, value_name = "FILE", env = "LBUILD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output directory of generated files
    #[arg(
        short = 'p',
        long = "path",
        value_name = "DIR",
        default_value = ".",
        global = true
    )]
    pub path: PathBuf,

    /// Set an option value, e.g. -D ':target=hosted' (repeatable)
    #[arg(short = 'D', long = "option", value_name = "NAME=VALUE", global = true)]
    pub options: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Cache directory for fetched repositories
    #[arg(long, value_name = "DIR", env = "LBUILD_CACHE", global = true)]
    pub cache_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the remote repositories of the project configuration
    Init,

    /// Refresh already fetched remote repositories
    Update,

    /// List repositories and their options
    #[command(name = "discover-repository", alias = "repo")]
    DiscoverRepository,

    /// List the available modules
    #[command(name = "discover-modules", alias = "modules")]
    DiscoverModules(commands::discover::ModulesArgs),

    /// Print the module dependency graph in Graphviz dot format
    Dependencies(commands::dependencies::DependenciesArgs),

    /// List the options of available modules
    #[command(name = "discover-module-options", alias = "options")]
    DiscoverModuleOptions(commands::discover::ModuleOptionsArgs),

    /// Describe one option
    #[command(name = "discover-option", alias = "option")]
    DiscoverOption(commands::discover::OptionArgs),

    /// List the values an option accepts
    #[command(name = "discover-option-values", alias = "option-values")]
    DiscoverOptionValues(commands::discover::OptionArgs),

    /// Generate the selected modules
    Build(commands::build::BuildArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::Init => commands::init::execute(&global, false),
            Commands::Update => commands::init::execute(&global, true),
            Commands::DiscoverRepository => commands::discover::repository(&global),
            Commands::DiscoverModules(args) => commands::discover::modules(&global, args),
            Commands::Dependencies(args) => commands::dependencies::execute(&global, args),
            Commands::DiscoverModuleOptions(args) => {
                commands::discover::module_options(&global, args)
            }
            Commands::DiscoverOption(args) => commands::discover::option(&global, args),
            Commands::DiscoverOptionValues(args) => {
                commands::discover::option_values(&global, args)
            }
            Commands::Build(args) => commands::build::execute(&global, args),
        }
    }
}
