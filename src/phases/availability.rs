//! Phase 2: Module Availability
//!
//! Every registered module is prepared against the merged repository
//! options: it declares its options and dependencies and decides whether it
//! is available in this configuration. Preparation of independent modules
//! runs in parallel.
//!
//! A submodule is only available when its parent is, and it implicitly
//! depends on its parent. The resulting [`AvailableModules`] set, not the
//! registered set, is the universe for selection.

use std::collections::BTreeMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::module::ModulePrepare;
use crate::option::{OptionScope, OptionSet, Scope};
use crate::registry::{ModuleEntry, Registry};

/// A module that passed its availability check.
#[derive(Debug, Clone)]
pub struct PreparedModule {
    pub entry: ModuleEntry,
    /// The module's own options, scoped to it.
    pub options: OptionSet,
    /// Dependency patterns as declared.
    pub dependencies: Vec<String>,
}

impl PreparedModule {
    pub fn fullname(&self) -> &str {
        &self.entry.fullname
    }
}

/// Available modules by fully-qualified name.
pub type AvailableModules = BTreeMap<String, PreparedModule>;

/// Prepare all registered modules and keep the available ones.
pub fn execute(registry: &Registry, repo_options: &OptionSet) -> Result<AvailableModules> {
    let entries: Vec<&ModuleEntry> = registry.modules().collect();
    let prepared: Vec<Option<PreparedModule>> = entries
        .par_iter()
        .map(|entry| prepare(entry, repo_options))
        .collect::<Result<_>>()?;

    let candidates: BTreeMap<String, PreparedModule> = prepared
        .into_iter()
        .flatten()
        .map(|module| (module.entry.fullname.clone(), module))
        .collect();

    let available: AvailableModules = candidates
        .iter()
        .filter(|(name, _)| ancestors_available(name, &candidates))
        .map(|(name, module)| (name.clone(), module.clone()))
        .collect();

    info!(
        "{} of {} module(s) available",
        available.len(),
        entries.len()
    );
    Ok(available)
}

fn prepare(entry: &ModuleEntry, repo_options: &OptionSet) -> Result<Option<PreparedModule>> {
    let scope = OptionScope::repository(&entry.repository, repo_options);
    let mut declarations = ModulePrepare::new();
    let available = entry.module.prepare(&mut declarations, &scope)?;
    if !available {
        debug!("Module {} is not available", entry.fullname);
        return Ok(None);
    }

    let (declared, mut dependencies) = declarations.into_parts();
    let mut options = OptionSet::new();
    for option in declared {
        options
            .insert(option.with_scope(Scope::Module(entry.fullname.clone())))
            .map_err(|e| Error::definition(entry.fullname.clone(), e.to_string()))?;
    }
    if let Some(parent) = &entry.parent {
        if !dependencies.contains(parent) {
            dependencies.insert(0, parent.clone());
        }
    }

    Ok(Some(PreparedModule {
        entry: entry.clone(),
        options,
        dependencies,
    }))
}

fn ancestors_available(name: &str, candidates: &BTreeMap<String, PreparedModule>) -> bool {
    let mut current = candidates.get(name);
    while let Some(module) = current {
        match &module.entry.parent {
            None => return true,
            Some(parent) => current = candidates.get(parent),
        }
    }
    false
}

/// Declared options of the named available modules.
pub fn module_options<'a>(
    available: &AvailableModules,
    modules: impl IntoIterator<Item = &'a String>,
) -> OptionSet {
    modules
        .into_iter()
        .filter_map(|name| available.get(name))
        .flat_map(|module| module.options.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleSpec;
    use crate::option::{ConfigOption, OptionValue};
    use crate::registry::RepositoryBuilder;
    use std::sync::Arc;

    fn registry() -> Registry {
        let mut builder = RepositoryBuilder::new("repo1", ".");
        builder.add_option(
            ConfigOption::enumeration("target", "", ["hosted", "stm32"])
                .unwrap()
                .with_default("hosted")
                .unwrap(),
        );
        builder
            .add_module(".", Arc::new(ModuleSpec::new("module1")))
            .add_module(
                ".",
                Arc::new(
                    ModuleSpec::new("module2")
                        .option(ConfigOption::numeric("size", "", None, None).unwrap())
                        .available(|options| {
                            Ok(options.value("target")
                                == Some(&OptionValue::Enumeration("stm32".to_string())))
                        }),
                ),
            )
            .add_module(".", Arc::new(ModuleSpec::new("submodule3").parent("module2")));
        let mut registry = Registry::new();
        registry.add_repository(builder.build().unwrap()).unwrap();
        registry
    }

    fn with_target(registry: &Registry, target: &str) -> OptionSet {
        let mut options = registry.repository_options();
        options.get_mut("repo1:target").unwrap().set_value(target).unwrap();
        options
    }

    #[test]
    fn test_unavailable_parent_hides_children() {
        let registry = registry();
        let available = execute(&registry, &with_target(&registry, "hosted")).unwrap();
        assert_eq!(available.keys().collect::<Vec<_>>(), vec!["repo1:module1"]);
    }

    #[test]
    fn test_available_modules_carry_scoped_options() {
        let registry = registry();
        let available = execute(&registry, &with_target(&registry, "stm32")).unwrap();
        assert_eq!(
            available.keys().collect::<Vec<_>>(),
            vec!["repo1:module1", "repo1:module2", "repo1:module2:submodule3"]
        );
        assert!(available["repo1:module2"].options.contains("repo1:module2:size"));
        assert!(module_options(&available, available.keys()).contains("repo1:module2:size"));
    }

    #[test]
    fn test_submodule_depends_on_parent() {
        let registry = registry();
        let available = execute(&registry, &with_target(&registry, "stm32")).unwrap();
        assert_eq!(
            available["repo1:module2:submodule3"].dependencies,
            vec!["repo1:module2".to_string()]
        );
    }

    #[test]
    fn test_prepare_errors_propagate() {
        let mut builder = RepositoryBuilder::new("repo1", ".");
        builder.add_module(
            ".",
            Arc::new(ModuleSpec::new("broken").available(|options| {
                options.require("missing").map(|_| true)
            })),
        );
        let mut registry = Registry::new();
        registry.add_repository(builder.build().unwrap()).unwrap();
        let result = execute(&registry, &registry.repository_options());
        assert!(matches!(result, Err(Error::UnknownOption { .. })));
    }
}
