//! # Discovery Commands
//!
//! Read-only commands that show what a configuration resolves to:
//!
//! - **`discover-repository`**: repositories and their options with values
//! - **`discover-modules`**: available modules, flat or as a tree
//! - **`discover-module-options`**: options of the modules a build would use
//! - **`discover-option`**: description and value of one option
//! - **`discover-option-values`**: accepted values of one option
//!
//! All of them see the options after the configuration file and `-D`
//! overrides are applied, so they answer "what would a build use". The
//! option commands resolve the same build set as `build`: the configured
//! and given selectors closed over their dependencies.

use std::borrow::Cow;
use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use lbuild::option::{ConfigOption, OptionSet, Scope};
use lbuild::phases::availability::AvailableModules;

use super::Session;
use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Show modules as a tree below their repositories
    #[arg(long)]
    pub tree: bool,
}

#[derive(Args, Debug)]
pub struct ModuleOptionsArgs {
    /// Module selector (repeatable), added to the configured modules
    #[arg(short, long = "module", value_name = "PATTERN")]
    pub modules: Vec<String>,
}

#[derive(Args, Debug)]
pub struct OptionArgs {
    /// Fully-qualified option name, e.g. `repo:gpio:pins`
    #[arg(short, long, value_name = "NAME")]
    pub option: String,
}

/// `discover-repository`
pub fn repository(global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (registry, resolution) = session.resolve()?;

    for repository in registry.repositories() {
        println!("{}  {}", repository.name, repository.path.display());
        if let Some(line) = first_line(&repository.description) {
            println!("  {}", line);
        }
        let scope = Scope::Repository(repository.name.clone());
        print_options(resolution.repo_options.iter().filter(|o| o.scope() == &scope));
        println!();
    }
    Ok(())
}

/// `discover-modules`
pub fn modules(global: &GlobalArgs, args: ModulesArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (_, resolution) = session.resolve()?;

    if args.tree {
        let root = module_tree(&resolution.available);
        print_tree(&root)?;
        return Ok(());
    }

    let width = resolution
        .available
        .keys()
        .map(|name| name.len())
        .max()
        .unwrap_or_default();
    for (name, module) in &resolution.available {
        println!(
            "{:width$}  {}",
            name,
            module.entry.short_description(),
            width = width
        );
    }
    Ok(())
}

/// `discover-module-options`
pub fn module_options(global: &GlobalArgs, args: ModuleOptionsArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (_, resolution) = session.resolve()?;
    let build_set = resolution.select(&session.selectors(&args.modules))?;

    for module in &build_set.plan.order {
        let scope = Scope::Module(module.clone());
        let mut options = build_set
            .module_options
            .iter()
            .filter(|o| o.scope() == &scope)
            .peekable();
        if options.peek().is_some() {
            println!("{}", module);
            print_options(options);
        }
    }
    Ok(())
}

/// `discover-option`
pub fn option(global: &GlobalArgs, args: OptionArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (_, resolution) = session.resolve()?;
    let build_set = resolution.select(&session.selectors(&[]))?;
    let options = all_options(build_set.repo_options(), &build_set.module_options);
    println!("{}", options.find(&args.option)?.factsheet());
    Ok(())
}

/// `discover-option-values`
pub fn option_values(global: &GlobalArgs, args: OptionArgs) -> Result<()> {
    let session = Session::open(global)?;
    let (_, resolution) = session.resolve()?;
    let build_set = resolution.select(&session.selectors(&[]))?;
    let options = all_options(build_set.repo_options(), &build_set.module_options);
    for value in options.find(&args.option)?.values() {
        println!("{}", value);
    }
    Ok(())
}

fn all_options(repo_options: &OptionSet, module_options: &OptionSet) -> OptionSet {
    repo_options
        .iter()
        .chain(module_options.iter())
        .cloned()
        .collect()
}

fn print_options<'a>(options: impl Iterator<Item = &'a ConfigOption>) {
    for option in options {
        println!("  {}", option.format().replace('\n', "\n  "));
        if let Some(description) = option.short_description() {
            println!("      {}", description.replace('\n', "\n      "));
        }
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Repositories at the top, modules nested below their parents.
fn module_tree(available: &AvailableModules) -> TreeNode {
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut repositories: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, module) in available {
        match &module.entry.parent {
            Some(parent) => children.entry(parent.as_str()).or_default().push(name),
            None => repositories
                .entry(module.entry.repository.as_str())
                .or_default()
                .push(name),
        }
    }

    fn node(name: &str, children: &BTreeMap<&str, Vec<&str>>) -> TreeNode {
        TreeNode {
            label: name.to_string(),
            children: children
                .get(name)
                .map(|names| names.iter().map(|child| node(child, children)).collect())
                .unwrap_or_default(),
        }
    }

    TreeNode {
        label: "modules".to_string(),
        children: repositories
            .into_iter()
            .map(|(repository, top)| TreeNode {
                label: repository.to_string(),
                children: top.iter().map(|name| node(name, &children)).collect(),
            })
            .collect(),
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug, PartialEq)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
