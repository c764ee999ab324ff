//! Phase 3: Dependency Resolution
//!
//! Turns the user's module selectors into the ordered build set.
//!
//! ## Process
//!
//! 1.  **Selection**: Each selector pattern is matched against the available
//!     modules. No selectors means `:**`, every available module. If nothing
//!     at all is selected the run fails with `NoModulesSelected`.
//!
//! 2.  **Closure**: Dependencies of selected modules are added until the set
//!     is closed. Every dependency pattern must match at least one available
//!     module, otherwise `UnresolvedDependency` names both ends.
//!
//! 3.  **Ordering**: Kahn's algorithm produces an order in which every module
//!     follows its dependencies, ties broken by name. Modules left over form
//!     a cycle, reported as `CyclicDependency`.
//!
//! 4.  **Levels**: Modules are grouped by dependency depth. Modules of one
//!     level never depend on each other and may be built in parallel.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write as _;

use log::{debug, info, warn};

use super::availability::AvailableModules;
use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Selector used when none is given.
pub const DEFAULT_SELECTOR: &str = ":**";

/// The resolved, ordered build set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    /// Modules in build order.
    pub order: Vec<String>,
    /// Direct dependencies of each module in the build set.
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Mutually independent groups, each depending only on earlier groups.
    pub levels: Vec<Vec<String>>,
}

impl BuildPlan {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.dependencies.contains_key(module)
    }

    /// Graphviz rendering of the dependency graph.
    pub fn graphviz(&self) -> String {
        let mut dot = String::from("digraph dependencies {\n  rankdir=BT;\n");
        for module in &self.order {
            let _ = writeln!(dot, "  \"{}\";", module);
        }
        for (module, dependencies) in &self.dependencies {
            for dependency in dependencies {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", module, dependency);
            }
        }
        dot.push_str("}\n");
        dot
    }
}

/// Resolve `selectors` against the available modules into a build plan.
pub fn execute(available: &AvailableModules, selectors: &[String]) -> Result<BuildPlan> {
    let defaults = [DEFAULT_SELECTOR.to_string()];
    let selectors = if selectors.is_empty() {
        &defaults[..]
    } else {
        selectors
    };

    let mut selected = BTreeSet::new();
    for selector in selectors {
        let pattern = Pattern::parse(selector)?;
        let matches = pattern.select(available.keys().map(String::as_str));
        if matches.is_empty() {
            warn!("Selector '{}' matches no available module", selector);
        }
        selected.extend(matches.into_iter().map(str::to_string));
    }
    if selected.is_empty() {
        return Err(Error::NoModulesSelected {
            selectors: selectors.to_vec(),
        });
    }
    info!("Selected {} module(s)", selected.len());

    let dependencies = close(available, selected)?;
    let order = topological_order(&dependencies)?;
    let levels = build_levels(&dependencies, &order);
    Ok(BuildPlan {
        order,
        dependencies,
        levels,
    })
}

/// Resolve the dependency patterns of one module.
pub fn resolve_module_dependencies(
    available: &AvailableModules,
    module: &str,
) -> Result<BTreeSet<String>> {
    let Some(prepared) = available.get(module) else {
        return Ok(BTreeSet::new());
    };
    let mut resolved = BTreeSet::new();
    for dependency in &prepared.dependencies {
        let pattern = Pattern::parse(dependency)
            .map_err(|e| Error::definition(module.to_string(), e.to_string()))?;
        let matches = pattern.select(available.keys().map(String::as_str));
        if matches.is_empty() {
            return Err(Error::UnresolvedDependency {
                module: module.to_string(),
                dependency: dependency.clone(),
            });
        }
        resolved.extend(
            matches
                .into_iter()
                .filter(|name| *name != module)
                .map(str::to_string),
        );
    }
    Ok(resolved)
}

fn close(
    available: &AvailableModules,
    selected: BTreeSet<String>,
) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let mut graph = BTreeMap::new();
    let mut queue: VecDeque<String> = selected.into_iter().collect();
    while let Some(module) = queue.pop_front() {
        if graph.contains_key(&module) {
            continue;
        }
        let dependencies = resolve_module_dependencies(available, &module)?;
        for dependency in &dependencies {
            if !graph.contains_key(dependency) {
                debug!("{} pulls in {}", module, dependency);
                queue.push_back(dependency.clone());
            }
        }
        graph.insert(module, dependencies);
    }
    Ok(graph)
}

/// Order modules so that each follows all of its dependencies.
pub fn topological_order(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>> {
    let mut remaining: BTreeMap<&str, usize> = graph
        .iter()
        .map(|(module, deps)| (module.as_str(), deps.len()))
        .collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (module, deps) in graph {
        for dependency in deps {
            dependents
                .entry(dependency.as_str())
                .or_default()
                .push(module.as_str());
        }
    }

    let mut ready: BTreeSet<&str> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(module, _)| *module)
        .collect();
    let mut order = Vec::with_capacity(graph.len());
    while let Some(module) = ready.pop_first() {
        remaining.remove(module);
        order.push(module.to_string());
        for dependent in dependents.get(module).into_iter().flatten() {
            if let Some(count) = remaining.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if !remaining.is_empty() {
        let cycle = find_cycle(graph, &remaining.keys().copied().collect());
        return Err(Error::CyclicDependency { cycle });
    }
    Ok(order)
}

/// Describe one cycle among the `stuck` modules as `a -> b -> a`.
fn find_cycle(graph: &BTreeMap<String, BTreeSet<String>>, stuck: &BTreeSet<&str>) -> String {
    let Some(start) = stuck.first().copied() else {
        return String::new();
    };
    let mut path: Vec<&str> = vec![start];
    let mut current = start;
    loop {
        // Every stuck module has a stuck dependency.
        let next = graph
            .get(current)
            .and_then(|deps| deps.iter().map(String::as_str).find(|d| stuck.contains(d)));
        let Some(next) = next else {
            return path.join(" -> ");
        };
        if let Some(position) = path.iter().position(|m| *m == next) {
            let mut cycle = path[position..].to_vec();
            cycle.push(next);
            return cycle.join(" -> ");
        }
        path.push(next);
        current = next;
    }
}

/// Group modules by dependency depth, names sorted within a level.
pub fn build_levels(graph: &BTreeMap<String, BTreeSet<String>>, order: &[String]) -> Vec<Vec<String>> {
    let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
    let mut levels: Vec<Vec<String>> = Vec::new();
    for module in order {
        let level = graph
            .get(module)
            .into_iter()
            .flatten()
            .filter_map(|dependency| depth.get(dependency.as_str()))
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth.insert(module.as_str(), level);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(module.clone());
    }
    for level in &mut levels {
        level.sort();
    }
    levels
}
