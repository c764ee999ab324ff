//! Collections of options and scoped lookup.

use std::collections::BTreeMap;

use super::{ConfigOption, OptionValue, Scope};
use crate::error::{Error, Result};
use crate::suggestions::find_similar;

/// Options keyed by fully-qualified name.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    options: BTreeMap<String, ConfigOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option; its fully-qualified name must be unique.
    pub fn insert(&mut self, option: ConfigOption) -> Result<()> {
        let fullname = option.fullname();
        if self.options.contains_key(&fullname) {
            return Err(Error::definition(
                fullname,
                "option is declared more than once",
            ));
        }
        self.options.insert(fullname, option);
        Ok(())
    }

    pub fn get(&self, fullname: &str) -> Option<&ConfigOption> {
        self.options.get(fullname)
    }

    pub fn get_mut(&mut self, fullname: &str) -> Option<&mut ConfigOption> {
        self.options.get_mut(fullname)
    }

    pub fn value(&self, fullname: &str) -> Option<&OptionValue> {
        self.get(fullname).and_then(ConfigOption::value)
    }

    pub fn contains(&self, fullname: &str) -> bool {
        self.options.contains_key(fullname)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in fully-qualified name order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.values()
    }

    /// The underlying namespace, for pattern resolution.
    pub fn as_map(&self) -> &BTreeMap<String, ConfigOption> {
        &self.options
    }

    /// Exact lookup that explains a miss.
    pub fn find(&self, fullname: &str) -> Result<&ConfigOption> {
        self.get(fullname).ok_or_else(|| {
            let candidates: Vec<&str> = self.options.keys().map(String::as_str).collect();
            Error::UnknownOption {
                name: fullname.to_string(),
                hint: find_similar(fullname, &candidates).map(|s| format!("Did you mean '{}'?", s)),
            }
        })
    }
}

impl FromIterator<ConfigOption> for OptionSet {
    /// Collect options, keeping the last of duplicate names.
    fn from_iter<I: IntoIterator<Item = ConfigOption>>(iter: I) -> Self {
        let options = iter
            .into_iter()
            .map(|option| (option.fullname(), option))
            .collect();
        Self { options }
    }
}

/// Read-only view of the options visible from a repository or a module.
///
/// Lookups of short names search the module's own options first and fall
/// back to the repository's options. Names containing a colon are treated
/// as fully-qualified.
#[derive(Debug, Clone, Copy)]
pub struct OptionScope<'a> {
    repository: &'a str,
    module: Option<&'a str>,
    repo_options: &'a OptionSet,
    module_options: Option<&'a OptionSet>,
}

impl<'a> OptionScope<'a> {
    /// Scope of a repository: only its repository options are visible.
    pub fn repository(repository: &'a str, repo_options: &'a OptionSet) -> Self {
        Self {
            repository,
            module: None,
            repo_options,
            module_options: None,
        }
    }

    /// Scope of a module inside `repository`.
    pub fn module(
        module: &'a str,
        repository: &'a str,
        repo_options: &'a OptionSet,
        module_options: &'a OptionSet,
    ) -> Self {
        Self {
            repository,
            module: Some(module),
            repo_options,
            module_options: Some(module_options),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a ConfigOption> {
        if name.contains(':') {
            return self
                .module_options
                .and_then(|options| options.get(name))
                .or_else(|| self.repo_options.get(name));
        }
        let local = match (self.module, self.module_options) {
            (Some(module), Some(options)) => options.get(&format!("{}:{}", module, name)),
            _ => None,
        };
        local.or_else(|| {
            self.repo_options
                .get(&format!("{}:{}", self.repository, name))
        })
    }

    pub fn value(&self, name: &str) -> Option<&'a OptionValue> {
        self.get(name).and_then(ConfigOption::value)
    }

    /// The value of `name`, failing if it is undeclared or unset.
    pub fn require(&self, name: &str) -> Result<&'a OptionValue> {
        let option = self.get(name).ok_or_else(|| Error::UnknownOption {
            name: name.to_string(),
            hint: Some(format!(
                "Option is not visible from '{}'",
                self.module.unwrap_or(self.repository)
            )),
        })?;
        option.value().ok_or_else(|| Error::MissingValue {
            option: option.fullname(),
            hint: None,
        })
    }

    /// Every option visible from this scope: the repository's options
    /// followed by the module's own options.
    pub fn visible(&self) -> Vec<&'a ConfigOption> {
        let repository = Scope::Repository(self.repository.to_string());
        let mut visible: Vec<&ConfigOption> = self
            .repo_options
            .iter()
            .filter(|option| option.scope() == &repository)
            .collect();
        if let (Some(module), Some(options)) = (self.module, self.module_options) {
            let module = Scope::Module(module.to_string());
            visible.extend(options.iter().filter(|option| option.scope() == &module));
        }
        visible
    }

    /// Template variables: every visible value under its fully-qualified
    /// name and under its short name, module values shadowing repository
    /// values.
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut variables = BTreeMap::new();
        for option in self.visible() {
            if let Some(value) = option.value() {
                variables.insert(option.fullname(), value.to_string());
                variables.insert(option.name().to_string(), value.to_string());
            }
        }
        variables
    }
}
