//! # Module Registration Surface
//!
//! A module is registered through the [`Module`] trait, which is called in
//! three stages:
//!
//! 1. [`Module::init`] names the module, places it under a parent module and
//!    describes it. Called once when its repository is registered.
//! 2. [`Module::prepare`] declares the module's options and dependencies and
//!    decides whether the module is available, given the resolved repository
//!    options. Called once per resolution pass.
//! 3. [`Module::build`] emits output files through a [`BuildEnv`]. Called for
//!    every module in the build set, in dependency order.
//!
//! [`ModuleSpec`] implements the trait with closures, for modules defined in
//! code. Declarative modules are loaded by [`crate::definition`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::option::{ConfigOption, OptionScope, OptionValue};
use crate::path::resolve_output;
use crate::render::{Renderer, TemplateContext};

/// A module definition.
pub trait Module: Send + Sync {
    /// Declare name, parent and description.
    fn init(&self, module: &mut ModuleInit) -> Result<()>;

    /// Declare options and dependencies; return whether the module is
    /// available under the resolved repository `options`.
    fn prepare(&self, module: &mut ModulePrepare, options: &OptionScope<'_>) -> Result<bool>;

    /// Generate the module's files.
    fn build(&self, env: &mut BuildEnv<'_>) -> Result<()>;
}

/// Identity declared by [`Module::init`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInit {
    pub name: String,
    /// Path of the parent module inside the repository, e.g. `module2` or
    /// `module2:submodule3`.
    pub parent: Option<String>,
    pub description: String,
}

/// Collects the declarations made by [`Module::prepare`].
#[derive(Debug, Default)]
pub struct ModulePrepare {
    options: Vec<ConfigOption>,
    dependencies: Vec<String>,
}

impl ModulePrepare {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_option(&mut self, option: ConfigOption) -> &mut Self {
        self.options.push(option);
        self
    }

    /// Depend on every module matched by `pattern`.
    pub fn depends(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.dependencies.push(pattern.into());
        self
    }

    pub(crate) fn into_parts(self) -> (Vec<ConfigOption>, Vec<String>) {
        (self.options, self.dependencies)
    }
}

/// A file produced by a module, not yet committed to the build log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Normalized absolute destination.
    pub path: PathBuf,
    /// Destination relative to the output root.
    pub relative: PathBuf,
    pub content: Vec<u8>,
    /// Identifier of the template or source the file came from.
    pub template: String,
}

/// Everything a module sees while building.
pub struct BuildEnv<'a> {
    module: &'a str,
    source_dir: &'a Path,
    outpath: &'a Path,
    options: OptionScope<'a>,
    renderer: &'a dyn Renderer,
    staged: Vec<StagedFile>,
}

impl<'a> BuildEnv<'a> {
    pub fn new(
        module: &'a str,
        source_dir: &'a Path,
        outpath: &'a Path,
        options: OptionScope<'a>,
        renderer: &'a dyn Renderer,
    ) -> Self {
        Self {
            module,
            source_dir,
            outpath,
            options,
            renderer,
            staged: Vec::new(),
        }
    }

    /// Fully-qualified name of the module being built.
    pub fn module_name(&self) -> &str {
        self.module
    }

    pub fn outpath(&self) -> &Path {
        self.outpath
    }

    pub fn options(&self) -> &OptionScope<'a> {
        &self.options
    }

    /// Value of an option visible to the module, by short or full name.
    pub fn option(&self, name: &str) -> Option<&'a OptionValue> {
        self.options.value(name)
    }

    pub fn require(&self, name: &str) -> Result<&'a OptionValue> {
        self.options.require(name)
    }

    /// Render a string with the module's option values.
    pub fn render_str(&self, template: &str, source: &str) -> Result<String> {
        self.renderer
            .render(template, source, &self.options.variables())
    }

    /// Render the template file `source` into `destination`.
    pub fn template(&mut self, source: &str, destination: &str) -> Result<()> {
        self.template_with(source, destination, TemplateContext::new())
    }

    /// Like [`BuildEnv::template`], with extra variables that shadow option
    /// values.
    pub fn template_with(
        &mut self,
        source: &str,
        destination: &str,
        extra: TemplateContext,
    ) -> Result<()> {
        let text = fs::read_to_string(self.source_dir.join(source)).map_err(|e| {
            Error::Template {
                template: source.to_string(),
                message: format!("cannot read template: {}", e),
                variable: None,
            }
        })?;
        let mut context = self.options.variables();
        context.extend(extra);
        let rendered = self.renderer.render(source, &text, &context)?;
        self.write(destination, rendered, source)
    }

    /// Copy the file `source` verbatim to `destination`.
    pub fn copy(&mut self, source: &str, destination: &str) -> Result<()> {
        let content = fs::read(self.source_dir.join(source))?;
        self.write(destination, content, source)
    }

    /// Emit `content` at `destination`, recording `origin` as its template.
    pub fn write(
        &mut self,
        destination: &str,
        content: impl Into<Vec<u8>>,
        origin: &str,
    ) -> Result<()> {
        let (path, relative) = resolve_output(self.outpath, destination)?;
        log::trace!("{} stages {}", self.module, relative.display());
        self.staged.push(StagedFile {
            path,
            relative,
            content: content.into(),
            template: origin.to_string(),
        });
        Ok(())
    }

    /// Files staged so far, in emission order.
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    pub fn into_staged(self) -> Vec<StagedFile> {
        self.staged
    }
}

type AvailableFn = dyn Fn(&OptionScope<'_>) -> Result<bool> + Send + Sync;
type BuildFn = dyn Fn(&mut BuildEnv<'_>) -> Result<()> + Send + Sync;

/// A module assembled from values and closures.
///
/// ```
/// use lbuild::module::ModuleSpec;
/// use lbuild::option::ConfigOption;
///
/// let gpio = ModuleSpec::new("gpio")
///     .description("GPIO driver")
///     .option(ConfigOption::numeric("pins", "Number of pins", Some(1), Some(64)).unwrap())
///     .depends(":platform")
///     .available(|options| Ok(options.value("target").is_some()))
///     .on_build(|env| env.write("gpio.hpp", "// gpio", "gpio.hpp.in"));
/// ```
pub struct ModuleSpec {
    init: ModuleInit,
    options: Vec<ConfigOption>,
    dependencies: Vec<String>,
    available: Option<Box<AvailableFn>>,
    build: Option<Box<BuildFn>>,
}

impl ModuleSpec {
    pub fn new(name: &str) -> Self {
        Self {
            init: ModuleInit {
                name: name.to_string(),
                ..ModuleInit::default()
            },
            options: Vec::new(),
            dependencies: Vec::new(),
            available: None,
            build: None,
        }
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.init.parent = Some(parent.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.init.description = description.to_string();
        self
    }

    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn depends(mut self, pattern: &str) -> Self {
        self.dependencies.push(pattern.to_string());
        self
    }

    /// Availability predicate. Without one the module is always available.
    pub fn available<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&OptionScope<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        self.available = Some(Box::new(predicate));
        self
    }

    pub fn on_build<F>(mut self, build: F) -> Self
    where
        F: Fn(&mut BuildEnv<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.build = Some(Box::new(build));
        self
    }
}

impl Module for ModuleSpec {
    fn init(&self, module: &mut ModuleInit) -> Result<()> {
        *module = self.init.clone();
        Ok(())
    }

    fn prepare(&self, module: &mut ModulePrepare, options: &OptionScope<'_>) -> Result<bool> {
        for option in &self.options {
            module.add_option(option.clone());
        }
        for dependency in &self.dependencies {
            module.depends(dependency.as_str());
        }
        match &self.available {
            Some(predicate) => predicate(options),
            None => Ok(true),
        }
    }

    fn build(&self, env: &mut BuildEnv<'_>) -> Result<()> {
        match &self.build {
            Some(build) => build(env),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("init", &self.init)
            .field("options", &self.options)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
