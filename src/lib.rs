//! # lbuild
//!
//! This library resolves and builds modular code-generation libraries. A
//! library is split into repositories, each declaring configuration options
//! and modules; a project selects modules, sets option values, and lbuild
//! generates the selected modules together with everything they depend on.
//! It is used by the `lbuild` command-line tool but can be embedded by any
//! application that registers its own modules.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use lbuild::module::ModuleSpec;
//! use lbuild::option::ConfigOption;
//! use lbuild::phases::orchestrator;
//! use lbuild::registry::{Registry, RepositoryBuilder};
//! use lbuild::render::SubstitutionRenderer;
//!
//! let mut repo = RepositoryBuilder::new("demo", ".");
//! repo.add_option(ConfigOption::string("target", "").unwrap().with_default("hosted").unwrap());
//! repo.add_module(".", Arc::new(ModuleSpec::new("gpio").on_build(|env| {
//!     let text = env.render_str("gpio.hpp.in", "// gpio for ${target}\n")?;
//!     env.write("gpio.hpp", text, "gpio.hpp.in")
//! })));
//!
//! let mut registry = Registry::new();
//! registry.add_repository(repo.build().unwrap()).unwrap();
//!
//! let resolution = orchestrator::resolve(&registry, &[]).unwrap();
//! let build_set = resolution.select(&[]).unwrap();
//! let output = build_set
//!     .build(std::path::Path::new("generated"), &SubstitutionRenderer)
//!     .unwrap();
//! assert_eq!(output.files.get_file("gpio.hpp").unwrap().content, b"// gpio for hosted\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Options (`option`)**: typed configuration values owned by a repository
//!   or a module, with a value space that validates raw strings.
//! - **Names and patterns (`pattern`)**: colon-separated qualified names and
//!   the wildcard patterns that select options and modules.
//! - **Modules (`module`, `definition`)**: units of generated code, defined in
//!   Rust through the [`module::Module`] trait or declared in YAML.
//! - **Registry (`registry`)**: the loaded repositories of one invocation.
//! - **Phases (`phases`)**: the pipeline from option merging over
//!   availability and dependency resolution to building and writing.
//! - **Build log (`buildlog`)**: the record of which module produced which
//!   file, and the arbiter of output collisions.
//!
//! ## Execution Flow
//!
//! 1.  **Repository options**: overrides from the project file, then from the
//!     command line, are merged into the declared repository options.
//! 2.  **Availability**: every module decides, from the repository options,
//!     whether it can be used and declares its options and dependencies.
//! 3.  **Dependencies**: the selected modules are closed over their
//!     dependencies and ordered.
//! 4.  **Module options**: the remaining overrides address options of the
//!     planned modules; one that addresses none of them is an error.
//! 5.  **Building**: modules generate files into memory, level by level.
//! 6.  **Writing**: the generated files are written to the output directory.

pub mod buildlog;
pub mod config;
pub mod defaults;
pub mod definition;
pub mod error;
pub mod exit_codes;
pub mod filesystem;
pub mod git;
pub mod module;
pub mod option;
pub mod path;
pub mod pattern;
pub mod phases;
pub mod registry;
pub mod render;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod pattern_proptest;
