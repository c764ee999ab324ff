//! Orchestrator for resolution and build
//!
//! This module chains the phases into the operations the commands need:
//! [`resolve`] runs phases 1-2 and yields a [`Resolution`].
//! [`Resolution::select`] runs phases 3-4 for a set of selectors and yields
//! a [`BuildSet`]. [`execute_build`] runs the whole pipeline.

use std::path::{Path, PathBuf};

use log::info;

use super::availability::{self, AvailableModules, PreparedModule};
use super::build::{self, BuildContext, BuildOutput};
use super::dependencies::{self, BuildPlan};
use super::options::{self, OverrideLayer};
use super::write;
use crate::error::Result;
use crate::option::{OptionScope, OptionSet};
use crate::registry::Registry;
use crate::render::Renderer;

/// Resolved repository options and available modules of one configuration.
#[derive(Debug)]
pub struct Resolution {
    /// Repository options after phase 1.
    pub repo_options: OptionSet,
    pub available: AvailableModules,
    layers: Vec<OverrideLayer>,
}

impl Resolution {
    /// Phase 3: the build plan for `selectors`.
    pub fn plan(&self, selectors: &[String]) -> Result<BuildPlan> {
        dependencies::execute(&self.available, selectors)
    }

    /// Phase 4: merge the module overrides over the modules of `plan`.
    ///
    /// Every module override must address an option of a planned module.
    pub fn configure(&self, plan: BuildPlan) -> Result<BuildSet<'_>> {
        let declared = availability::module_options(&self.available, &plan.order);
        let module_options = options::merge_module_options(&declared, &self.layers)?;
        info!(
            "Configured {} module(s) with {} module option(s)",
            plan.len(),
            module_options.len()
        );
        Ok(BuildSet {
            resolution: self,
            plan,
            module_options,
        })
    }

    /// Phases 3 and 4.
    pub fn select(&self, selectors: &[String]) -> Result<BuildSet<'_>> {
        self.configure(self.plan(selectors)?)
    }

    pub fn module(&self, fullname: &str) -> Option<&PreparedModule> {
        self.available.get(fullname)
    }
}

/// The planned modules together with their merged options.
#[derive(Debug)]
pub struct BuildSet<'r> {
    resolution: &'r Resolution,
    pub plan: BuildPlan,
    /// Options of the planned modules after phase 4.
    pub module_options: OptionSet,
}

impl<'r> BuildSet<'r> {
    pub fn repo_options(&self) -> &'r OptionSet {
        &self.resolution.repo_options
    }

    /// Options visible from an available module.
    pub fn scope<'a>(&'a self, module: &'a PreparedModule) -> OptionScope<'a> {
        OptionScope::module(
            &module.entry.fullname,
            &module.entry.repository,
            &self.resolution.repo_options,
            &self.module_options,
        )
    }

    /// Phase 5: build the planned modules in memory.
    pub fn build(&self, outpath: &Path, renderer: &dyn Renderer) -> Result<BuildOutput> {
        let context = BuildContext {
            available: &self.resolution.available,
            repo_options: &self.resolution.repo_options,
            module_options: &self.module_options,
            outpath,
            renderer,
        };
        build::execute(&self.plan, &context)
    }
}

/// Phases 1 and 2.
pub fn resolve(registry: &Registry, layers: &[OverrideLayer]) -> Result<Resolution> {
    let repo_options = options::merge_repository_options(&registry.repository_options(), layers)?;
    let available = availability::execute(registry, &repo_options)?;
    info!(
        "Resolved {} repository option(s), {} available module(s)",
        repo_options.len(),
        available.len()
    );
    Ok(Resolution {
        repo_options,
        available,
        layers: layers.to_vec(),
    })
}

/// How a build run delivers its output.
pub struct BuildSettings<'a> {
    pub outpath: &'a Path,
    pub renderer: &'a dyn Renderer,
    /// Build in memory only; neither files nor the log are written.
    pub dry_run: bool,
    /// Where to persist the build log, if anywhere.
    pub log_path: Option<PathBuf>,
}

/// Execute the complete build (phases 1-6).
///
/// Files are written only after every module built successfully, then the
/// build log is persisted. A failure while writing leaves the files written
/// so far in place.
pub fn execute_build(
    registry: &Registry,
    layers: &[OverrideLayer],
    selectors: &[String],
    settings: &BuildSettings<'_>,
) -> Result<BuildOutput> {
    let resolution = resolve(registry, layers)?;
    let build_set = resolution.select(selectors)?;
    let output = build_set.build(settings.outpath, settings.renderer)?;

    if settings.dry_run {
        info!("Dry run: {} file(s) not written", output.files.len());
        return Ok(output);
    }

    write::execute(&output.files, output.log.outpath())?;
    if let Some(log_path) = &settings.log_path {
        output.log.write(log_path)?;
        info!("Wrote build log {}", log_path.display());
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleSpec;
    use crate::option::ConfigOption;
    use crate::registry::RepositoryBuilder;
    use crate::render::SubstitutionRenderer;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn registry() -> Registry {
        let mut builder = RepositoryBuilder::new("repo", ".");
        builder.add_option(
            ConfigOption::enumeration("target", "", ["hosted", "stm32"])
                .unwrap()
                .with_default("hosted")
                .unwrap(),
        );
        builder.add_module(
            ".",
            Arc::new(
                ModuleSpec::new("gpio")
                    .option(ConfigOption::numeric("pins", "", Some(1), Some(64)).unwrap())
                    .on_build(|env| {
                        let text = env.render_str("gpio.hpp.in", "${target}:${pins}\n")?;
                        env.write("src/gpio.hpp", text, "gpio.hpp.in")
                    }),
            ),
        );
        builder.add_module(
            ".",
            Arc::new(
                ModuleSpec::new("stm32")
                    .available(|options| Ok(options.require("target")?.to_string() == "stm32")),
            ),
        );
        let mut registry = Registry::new();
        registry.add_repository(builder.build().unwrap()).unwrap();
        registry
    }

    fn layer(definitions: &[&str]) -> OverrideLayer {
        OverrideLayer::new(
            "command line",
            definitions
                .iter()
                .map(|d| options::OptionOverride::parse(d).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_resolve_filters_by_repository_options() {
        let registry = registry();
        let hosted = resolve(&registry, &[]).unwrap();
        assert!(hosted.module("repo:stm32").is_none());

        let stm32 = resolve(&registry, &[layer(&["repo:target=stm32"])]).unwrap();
        assert!(stm32.module("repo:stm32").is_some());
    }

    #[test]
    fn test_module_option_visible_in_scope() {
        let registry = registry();
        let resolution = resolve(&registry, &[layer(&[":gpio:pins=0x10"])]).unwrap();
        let build_set = resolution.select(&[]).unwrap();
        let gpio = resolution.module("repo:gpio").unwrap();
        let scope = build_set.scope(gpio);
        assert_eq!(scope.require("pins").unwrap().to_string(), "16");
        assert_eq!(scope.require("target").unwrap().to_string(), "hosted");
    }

    #[test]
    fn test_module_overrides_address_the_build_set() {
        let registry = registry();
        let resolution = resolve(&registry, &[layer(&["repo:gpio:pins=8"])]).unwrap();
        assert!(resolution.select(&["repo:gpio".to_string()]).is_ok());

        let stm32 = resolve(
            &registry,
            &[layer(&["repo:target=stm32", "repo:gpio:pins=8"])],
        )
        .unwrap();
        assert!(matches!(
            stm32.select(&["repo:stm32".to_string()]),
            Err(crate::error::Error::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_execute_build_writes_files_and_log() {
        let out = TempDir::new().unwrap();
        let log_path = out.path().join("project.yaml.log");
        let renderer = SubstitutionRenderer;
        let settings = BuildSettings {
            outpath: out.path(),
            renderer: &renderer,
            dry_run: false,
            log_path: Some(log_path.clone()),
        };
        let output = execute_build(
            &registry(),
            &[layer(&["repo:gpio:pins=8"])],
            &["repo:gpio".to_string()],
            &settings,
        )
        .unwrap();

        assert_eq!(output.files.len(), 1);
        assert_eq!(
            fs::read_to_string(out.path().join("src/gpio.hpp")).unwrap(),
            "hosted:8\n"
        );
        let log = crate::buildlog::BuildLog::read(&log_path).unwrap();
        assert_eq!(log.files_of("repo:gpio").unwrap().len(), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let out = TempDir::new().unwrap();
        let renderer = SubstitutionRenderer;
        let settings = BuildSettings {
            outpath: out.path(),
            renderer: &renderer,
            dry_run: true,
            log_path: Some(out.path().join("project.yaml.log")),
        };
        let output = execute_build(
            &registry(),
            &[layer(&["repo:gpio:pins=8"])],
            &[],
            &settings,
        )
        .unwrap();
        assert_eq!(output.files.len(), 1);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
