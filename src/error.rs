//! # Error Handling
//!
//! This module defines the centralized error type for `lbuild`. It uses the
//! `thiserror` library to create a single `Error` enum that covers every
//! failure mode of the resolution engine and its collaborators.
//!
//! ## Key Components
//!
//! - **`Error`**: All possible errors. Each variant carries enough context
//!   (option names, attempted values, module names, paths) for the user to
//!   fix the configuration without re-running in verbose mode.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Resolution errors fall into these groups:
//!
//! - Naming: `Format`.
//! - Option values: `Value`, `MissingValue`.
//! - Overrides: `UnknownOption`, `Conflict`.
//! - Module selection: `NoModulesSelected`, `UnresolvedDependency`,
//!   `CyclicDependency`.
//! - Build: `BuildConflict`, `Template`, `Path`.
//! - Definitions and configuration: `Definition`, `ConfigParse`, `Repository`.
//!
//! None of these are recovered from inside the library; they all describe a
//! configuration or authoring defect and are surfaced to the caller as-is.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for lbuild operations
#[derive(Error, Debug)]
pub enum Error {
    /// A qualified name or pattern is malformed.
    #[error("Malformed name '{name}': {message}")]
    Format { name: String, message: String },

    /// A value lies outside the value-space of an option.
    ///
    /// The option keeps its previous value.
    #[error("Invalid value '{value}' for option '{option}': expected {expected}")]
    Value {
        option: String,
        value: String,
        /// Human readable description of the value-space.
        expected: String,
    },

    /// An option is required but has no value.
    #[error("Option '{option}' has no value{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    MissingValue {
        option: String,
        hint: Option<String>,
    },

    /// An override or lookup addresses no declared option.
    #[error("Unknown option '{name}'{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnknownOption { name: String, hint: Option<String> },

    /// Two equally specific overrides assign different values to one option.
    #[error("Conflicting values for option '{option}': '{first}' ({first_pattern}) and '{second}' ({second_pattern})")]
    Conflict {
        option: String,
        first_pattern: String,
        first: String,
        second_pattern: String,
        second: String,
    },

    /// The module selectors matched no available module.
    #[error("No modules selected by [{}]", selectors.join(", "))]
    NoModulesSelected { selectors: Vec<String> },

    /// A module depends on a module that is not available.
    #[error("Module '{module}' depends on '{dependency}', which is not available")]
    UnresolvedDependency { module: String, dependency: String },

    /// The dependency graph of the build set contains a cycle.
    #[error("Cyclic module dependency: {cycle}")]
    CyclicDependency { cycle: String },

    /// Two modules generate the same output file.
    #[error("Build conflict for '{}': generated by '{first}' and '{second}'", path.display())]
    BuildConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// A repository or module definition is invalid.
    #[error("Invalid definition in '{origin}': {message}")]
    Definition { origin: String, message: String },

    /// An error occurred while rendering a template.
    ///
    /// May include the name of the problematic variable when applicable.
    #[error("Template error in '{template}': {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        template: String,
        message: String,
        variable: Option<String>,
    },

    /// An error occurred while parsing the project configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        hint: Option<String>,
    },

    /// A repository could not be located or loaded.
    #[error("Repository error for '{name}': {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Repository {
        name: String,
        message: String,
        hint: Option<String>,
    },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}@{r#ref}: {message}")]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {message}")]
    Argument { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Shorthand for a `Format` error.
    pub fn format(name: &str, message: impl Into<String>) -> Self {
        Error::Format {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a `Definition` error.
    pub fn definition(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Definition {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Whether the error was raised while rendering templates.
    pub fn is_template_error(&self) -> bool {
        matches!(self, Error::Template { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
