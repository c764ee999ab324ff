//! # lbuild CLI
//!
//! This is the binary entry point for the `lbuild` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging from the `-v` count, unless `RUST_LOG` is set.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting errors and translating them into process exit codes.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process;

use clap::Parser;

use lbuild::exit_codes;

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(error) = cli.execute() {
        eprintln!("ERROR: {}", error);
        for cause in error.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(exit_codes::for_error(&error));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
