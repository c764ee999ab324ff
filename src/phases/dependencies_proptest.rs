//! Property-based tests for dependency closure and build ordering.

#[cfg(test)]
mod proptest_tests {
    use crate::module::ModuleSpec;
    use crate::option::OptionSet;
    use crate::phases::availability::{self, AvailableModules};
    use crate::phases::dependencies;
    use crate::registry::{Registry, RepositoryBuilder};
    use proptest::prelude::*;
    use std::sync::Arc;

    const MODULES: usize = 8;

    /// Module `i` may depend on any module `j < i`, which keeps the graph acyclic.
    fn acyclic_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
        prop::collection::vec(any::<u8>(), MODULES).prop_map(|masks| {
            masks
                .iter()
                .enumerate()
                .map(|(i, mask)| (0..i).filter(|j| mask & (1 << j) != 0).collect())
                .collect()
        })
    }

    fn available(graph: &[Vec<usize>]) -> AvailableModules {
        let mut builder = RepositoryBuilder::new("repo", ".");
        for (i, deps) in graph.iter().enumerate() {
            let mut spec = ModuleSpec::new(&format!("m{}", i));
            for j in deps {
                spec = spec.depends(&format!("repo:m{}", j));
            }
            builder.add_module(".", Arc::new(spec));
        }
        let mut registry = Registry::new();
        registry.add_repository(builder.build().unwrap()).unwrap();
        availability::execute(&registry, &OptionSet::new()).unwrap()
    }

    fn selectors(mask: u8) -> Vec<String> {
        let mask = if mask == 0 { 1 } else { mask };
        (0..MODULES)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| format!("repo:m{}", i))
            .collect()
    }

    proptest! {
        /// Property: every module comes after all of its dependencies
        #[test]
        fn dependencies_precede_dependents(graph in acyclic_graph(), mask in any::<u8>()) {
            let available = available(&graph);
            let plan = dependencies::execute(&available, &selectors(mask)).unwrap();

            let position = |name: &str| plan.order.iter().position(|m| m == name);
            for (module, deps) in &plan.dependencies {
                let after = position(module).unwrap();
                for dep in deps {
                    let before = position(dep);
                    prop_assert!(before.is_some(), "{} missing from the build set", dep);
                    prop_assert!(before.unwrap() < after, "{} not before {}", dep, module);
                }
            }
        }

        /// Property: closing an already closed build set changes nothing
        #[test]
        fn closure_is_idempotent(graph in acyclic_graph(), mask in any::<u8>()) {
            let available = available(&graph);
            let plan = dependencies::execute(&available, &selectors(mask)).unwrap();
            let again = dependencies::execute(&available, &plan.order).unwrap();
            prop_assert_eq!(plan, again);
        }

        /// Property: every level depends only on earlier levels
        #[test]
        fn levels_depend_on_earlier_levels(graph in acyclic_graph(), mask in any::<u8>()) {
            let available = available(&graph);
            let plan = dependencies::execute(&available, &selectors(mask)).unwrap();

            let level_of = |name: &str| plan.levels.iter().position(|level| level.iter().any(|m| m == name));
            for (module, deps) in &plan.dependencies {
                let level = level_of(module).unwrap();
                for dep in deps {
                    prop_assert!(level_of(dep).unwrap() < level);
                }
            }
        }
    }
}
