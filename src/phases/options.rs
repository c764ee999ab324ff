//! Phases 1 and 3: Option Merging
//!
//! Overrides arrive in layers: first the project configuration file, then the
//! command line. Each layer is applied on top of the result of the previous
//! one, starting from the declared defaults.
//!
//! ## Process (per layer)
//!
//! 1.  **Resolution**: Every override pattern is resolved against the names
//!     of the declared options. A pattern that addresses nothing fails with
//!     `UnknownOption`.
//!
//! 2.  **Validation**: Each addressed option parses the raw value. Invalid
//!     values are logged one by one and the first is returned, so a single
//!     run reports all of them.
//!
//! 3.  **Specificity**: Per option, the most specific override wins. Two
//!     overrides of equal specificity assigning different values fail with
//!     `Conflict`; identical values are accepted.
//!
//! Overrides with two segments (`repo:option`) address repository options
//! and are merged in phase 1. Longer overrides address module options and
//! are merged in phase 4, over the modules of the build plan.

use std::collections::BTreeMap;

use log::{debug, error};

use crate::error::{Error, Result};
use crate::option::{OptionSet, OptionValue};
use crate::pattern::{Pattern, Specificity};
use crate::suggestions::find_similar;

/// A `(pattern, raw value)` pair supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOverride {
    pub pattern: Pattern,
    pub value: String,
}

impl OptionOverride {
    pub fn new(pattern: &str, value: &str) -> Result<Self> {
        let pattern = Pattern::parse(pattern)?;
        if pattern.depth() < 2 {
            return Err(Error::format(
                pattern.as_str(),
                "option names need at least a repository and an option segment",
            ));
        }
        Ok(Self {
            pattern,
            value: value.trim().to_string(),
        })
    }

    /// Parse `pattern=value` as given on the command line.
    pub fn parse(definition: &str) -> Result<Self> {
        match definition.split_once('=') {
            Some((pattern, value)) => Self::new(pattern, value),
            None => Err(Error::Argument {
                message: format!("option definition '{}' is not of the form name=value", definition),
            }),
        }
    }

    /// Whether the override addresses repository options.
    pub fn is_repository_override(&self) -> bool {
        self.pattern.depth() == 2
    }
}

/// Overrides from one source.
#[derive(Debug, Clone, Default)]
pub struct OverrideLayer {
    /// Where the overrides came from, for log messages.
    pub origin: String,
    pub overrides: Vec<OptionOverride>,
}

impl OverrideLayer {
    pub fn new(origin: &str, overrides: Vec<OptionOverride>) -> Self {
        Self {
            origin: origin.to_string(),
            overrides,
        }
    }
}

/// Phase 1: apply the repository overrides of every layer.
pub fn merge_repository_options(declared: &OptionSet, layers: &[OverrideLayer]) -> Result<OptionSet> {
    merge_layers(declared, layers, OptionOverride::is_repository_override)
}

/// Phase 4: apply the module overrides of every layer.
pub fn merge_module_options(declared: &OptionSet, layers: &[OverrideLayer]) -> Result<OptionSet> {
    merge_layers(declared, layers, |o| !o.is_repository_override())
}

fn merge_layers<F>(declared: &OptionSet, layers: &[OverrideLayer], select: F) -> Result<OptionSet>
where
    F: Fn(&OptionOverride) -> bool,
{
    let mut merged = declared.clone();
    for layer in layers {
        let overrides: Vec<&OptionOverride> =
            layer.overrides.iter().filter(|o| select(o)).collect();
        if overrides.is_empty() {
            continue;
        }
        debug!("Applying {} override(s) from {}", overrides.len(), layer.origin);
        merge_layer(&mut merged, &overrides)?;
    }
    Ok(merged)
}

struct Candidate<'o> {
    specificity: Specificity,
    source: &'o OptionOverride,
    value: OptionValue,
}

/// Apply one layer. `options` is left unchanged on error.
fn merge_layer(options: &mut OptionSet, overrides: &[&OptionOverride]) -> Result<()> {
    let mut candidates: BTreeMap<String, Vec<Candidate<'_>>> = BTreeMap::new();
    let mut failure: Option<Error> = None;

    for &source in overrides {
        let targets = source.pattern.resolve(options.as_map());
        if targets.is_empty() {
            let names: Vec<&str> = options.as_map().keys().map(String::as_str).collect();
            return Err(Error::UnknownOption {
                name: source.pattern.to_string(),
                hint: find_similar(source.pattern.as_str(), &names)
                    .map(|s| format!("Did you mean '{}'?", s)),
            });
        }
        for (name, option) in targets {
            match option.parse_value(&source.value) {
                Ok(value) => candidates.entry(name.to_string()).or_default().push(Candidate {
                    specificity: source.pattern.specificity(),
                    source,
                    value,
                }),
                Err(e) => {
                    error!("{}", e);
                    failure.get_or_insert(e);
                }
            }
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    let mut winners = Vec::with_capacity(candidates.len());
    for (name, mut group) in candidates {
        group.sort_by_key(|c| c.specificity);
        for pair in group.windows(2) {
            if pair[0].specificity == pair[1].specificity && pair[0].value != pair[1].value {
                return Err(Error::Conflict {
                    option: name,
                    first_pattern: pair[0].source.pattern.to_string(),
                    first: pair[0].source.value.clone(),
                    second_pattern: pair[1].source.pattern.to_string(),
                    second: pair[1].source.value.clone(),
                });
            }
        }
        if let Some(winner) = group.pop() {
            winners.push((name, winner.source, winner.value));
        }
    }

    for (name, source, value) in winners {
        if let Some(option) = options.get_mut(&name) {
            debug!("{} = {} (from '{}')", name, value, source.pattern);
            option.assign(value)?;
        }
    }
    Ok(())
}
