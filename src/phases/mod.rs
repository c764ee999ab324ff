//! Implementation of the phases of an lbuild resolution and build.
//!
//! ## Overview
//!
//! A build follows 6 phases:
//! 1. Repository Options - Merge overrides into the declared repository options
//! 2. Availability - Ask every module whether it is available, collecting the
//!    options and dependencies it declares
//! 3. Dependencies - Select modules, close over dependencies and order them
//! 4. Module Options - Merge overrides into the options of the planned modules
//! 5. Building - Run the selected modules and stage their output in memory
//! 6. Writing to Disk - Write the staged output to the output directory
//!
//! Phases 1 to 4 only read the [`crate::registry::Registry`]; the discovery
//! commands stop after them. Each phase depends only on the previous phases
//! and the foundation modules.

pub mod availability;
pub mod build;
pub mod dependencies;
pub mod options;
pub mod orchestrator;
pub mod write;

#[cfg(test)]
mod dependencies_proptest;
