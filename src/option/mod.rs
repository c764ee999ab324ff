//! # Option Model
//!
//! Options are the typed, validated configuration values that repositories
//! and modules declare. Every option has:
//!
//! - a **name** without colons,
//! - an owning **scope** (unbound, a repository, or a module),
//! - a **description** whose first paragraph is its title,
//! - a **value space** (string, boolean, numeric range or enumeration),
//! - a current **value**, possibly unset.
//!
//! A value that reaches an option has always been validated against its value
//! space. Invalid input leaves the option untouched and returns
//! [`Error::Value`] carrying the attempted value and the expected values.
//!
//! The fully-qualified name joins the scope path and the option name with
//! colons: `repo:opt` for repository options, `repo:module:sub:opt` for
//! module options.

use std::fmt;

use crate::error::{Error, Result};

mod set;
pub mod value;

pub use set::{OptionScope, OptionSet};

/// Column limit used when rendering long enumerations.
pub const LINE_WIDTH: usize = 120;

/// Column limit for the wrapped description title.
const TITLE_WIDTH: usize = 80;

/// A validated option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Boolean(bool),
    Numeric(i64),
    Enumeration(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) | OptionValue::Enumeration(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) | OptionValue::Enumeration(s) => f.write_str(s),
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Numeric(n) => write!(f, "{}", n),
        }
    }
}

/// The set of values an option accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSpace {
    /// Any string.
    String,
    /// `true`/`false`, accepting the usual literal spellings.
    Boolean,
    /// Integers, optionally bounded (inclusive).
    Numeric {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    /// One of a fixed set of case-sensitive symbols, kept sorted.
    Enumeration(Vec<String>),
}

impl ValueSpace {
    /// Validate a raw value against this space.
    ///
    /// Returns `None` when the value is not a member.
    fn parse(&self, raw: &str) -> Option<OptionValue> {
        match self {
            ValueSpace::String => Some(OptionValue::String(raw.to_string())),
            ValueSpace::Boolean => value::parse_boolean(raw).map(OptionValue::Boolean),
            ValueSpace::Numeric { minimum, maximum } => {
                let number = value::parse_integer(raw)?;
                if minimum.is_some_and(|min| number < min) || maximum.is_some_and(|max| number > max)
                {
                    return None;
                }
                Some(OptionValue::Numeric(number))
            }
            ValueSpace::Enumeration(symbols) => symbols
                .iter()
                .find(|symbol| symbol.as_str() == raw)
                .map(|symbol| OptionValue::Enumeration(symbol.clone())),
        }
    }

    /// Whether an already typed value belongs to this space.
    fn contains(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (ValueSpace::String, OptionValue::String(_)) => true,
            (ValueSpace::Boolean, OptionValue::Boolean(_)) => true,
            (ValueSpace::Numeric { minimum, maximum }, OptionValue::Numeric(n)) => {
                !minimum.is_some_and(|min| *n < min) && !maximum.is_some_and(|max| *n > max)
            }
            (ValueSpace::Enumeration(symbols), OptionValue::Enumeration(s)) => symbols.contains(s),
            _ => false,
        }
    }

    /// The accepted values, one entry per line of `discover-option-values`.
    pub fn values(&self) -> Vec<String> {
        match self {
            ValueSpace::String => vec!["String".to_string()],
            ValueSpace::Boolean => vec!["true".to_string(), "false".to_string()],
            ValueSpace::Numeric { .. } => vec![self.hint()],
            ValueSpace::Enumeration(symbols) => symbols.clone(),
        }
    }

    /// Single-line description of the accepted values.
    pub fn hint(&self) -> String {
        match self {
            ValueSpace::String => "String".to_string(),
            ValueSpace::Boolean => "true, false".to_string(),
            ValueSpace::Numeric { minimum, maximum } => format!(
                "{} ... {}",
                minimum.map_or("-Inf".to_string(), |m| m.to_string()),
                maximum.map_or("+Inf".to_string(), |m| m.to_string())
            ),
            ValueSpace::Enumeration(symbols) => symbols.join(", "),
        }
    }
}

/// Owner of an option.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Not yet attached to a repository or module.
    #[default]
    Unbound,
    /// Repository option, holding the repository name.
    Repository(String),
    /// Module option, holding the module's fully-qualified name.
    Module(String),
}

/// A named, typed configuration value.
#[derive(Debug, Clone)]
pub struct ConfigOption {
    name: String,
    scope: Scope,
    description: String,
    value: Option<OptionValue>,
    space: ValueSpace,
}

impl ConfigOption {
    fn new(name: &str, description: &str, space: ValueSpace) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            scope: Scope::Unbound,
            description: description.to_string(),
            value: None,
            space,
        })
    }

    /// A free-form string option without a default.
    pub fn string(name: &str, description: &str) -> Result<Self> {
        Self::new(name, description, ValueSpace::String)
    }

    /// A boolean option. Defaults to `false`.
    pub fn boolean(name: &str, description: &str) -> Result<Self> {
        let mut option = Self::new(name, description, ValueSpace::Boolean)?;
        option.value = Some(OptionValue::Boolean(false));
        Ok(option)
    }

    /// An integer option with optional inclusive bounds.
    pub fn numeric(
        name: &str,
        description: &str,
        minimum: Option<i64>,
        maximum: Option<i64>,
    ) -> Result<Self> {
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                return Err(Error::definition(
                    name,
                    format!("minimum {} is larger than maximum {}", min, max),
                ));
            }
        }
        Self::new(name, description, ValueSpace::Numeric { minimum, maximum })
    }

    /// An option accepting one of `values`.
    ///
    /// The symbols must be unique and non-empty; they are stored sorted.
    pub fn enumeration<I, S>(name: &str, description: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symbols: Vec<String> = values.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(Error::definition(name, "enumeration declares no values"));
        }
        symbols.sort();
        if let Some(pair) = symbols.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::definition(
                name,
                format!("enumeration value '{}' is declared twice", pair[0]),
            ));
        }
        if let Some(empty) = symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(Error::definition(
                name,
                format!("enumeration value '{}' is blank", empty),
            ));
        }
        Self::new(name, description, ValueSpace::Enumeration(symbols))
    }

    /// Set the default value, validating it.
    pub fn with_default(mut self, raw: &str) -> Result<Self> {
        self.set_value(raw)?;
        Ok(self)
    }

    /// Attach the option to its owner.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value_space(&self) -> &ValueSpace {
        &self.space
    }

    pub fn value(&self) -> Option<&OptionValue> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Fully-qualified name, e.g. `repo:module:option`.
    pub fn fullname(&self) -> String {
        match &self.scope {
            Scope::Unbound => self.name.clone(),
            Scope::Repository(owner) | Scope::Module(owner) => format!("{}:{}", owner, self.name),
        }
    }

    /// Validate a raw value without changing the option.
    pub fn parse_value(&self, raw: &str) -> Result<OptionValue> {
        self.space.parse(raw).ok_or_else(|| Error::Value {
            option: self.fullname(),
            value: raw.to_string(),
            expected: self.space.hint(),
        })
    }

    /// Validate and store a raw value.
    pub fn set_value(&mut self, raw: &str) -> Result<()> {
        self.value = Some(self.parse_value(raw)?);
        Ok(())
    }

    /// Store an already typed value after checking it belongs to the space.
    pub fn assign(&mut self, value: OptionValue) -> Result<()> {
        if !self.space.contains(&value) {
            return Err(Error::Value {
                option: self.fullname(),
                value: value.to_string(),
                expected: self.space.hint(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// Accepted values; for enumerations the sorted symbol list.
    pub fn values(&self) -> Vec<String> {
        self.space.values()
    }

    pub fn values_hint(&self) -> String {
        self.space.hint()
    }

    /// Split the description into a title (first paragraph, wrapped at 80
    /// columns) and the remaining body.
    pub fn split_description(&self) -> (Option<String>, Option<String>) {
        let mut title = Vec::new();
        let mut body = Vec::new();
        let mut title_found = false;
        for line in self.description.lines().map(str::trim_end) {
            if title_found {
                body.push(line);
            } else if line.is_empty() {
                title_found = !title.is_empty();
            } else {
                title.push(line);
            }
        }

        let title = textwrap::fill(&title.join(" "), TITLE_WIDTH);
        let body = body.join("\n").trim().to_string();
        (
            Some(title).filter(|t| !t.is_empty()),
            Some(body).filter(|b| !b.is_empty()),
        )
    }

    /// First paragraph of the description.
    pub fn short_description(&self) -> Option<String> {
        self.split_description().0
    }

    /// One-line (or wrapped, for long enumerations) rendering:
    /// `<fullname> = <value>  [<values>]`.
    pub fn format(&self) -> String {
        match &self.space {
            ValueSpace::Enumeration(_) => self.format_enumeration(),
            _ => match &self.value {
                None => format!("{} = [{}]", self.fullname(), self.values_hint()),
                Some(value) => format!("{} = {}  [{}]", self.fullname(), value, self.values_hint()),
            },
        }
    }

    fn format_enumeration(&self) -> String {
        let name = format!("{} = ", self.fullname());
        let name_width = name.chars().count();
        let values = self.values_hint();
        match &self.value {
            None => {
                // Opening and closing brackets.
                let width = LINE_WIDTH.saturating_sub(name_width + 2).max(1);
                let indent = " ".repeat(name_width + 1);
                let wrapped = textwrap::wrap(&values, width).join(&format!("\n{}", indent));
                format!("{}[{}]", name, wrapped)
            }
            Some(value) => {
                // Two spaces and two brackets.
                let overhead = name_width + value.to_string().chars().count() + 4;
                let values = if values.chars().count() + overhead > LINE_WIDTH {
                    let mark = " ...";
                    let max_length = LINE_WIDTH.saturating_sub(overhead + mark.len());
                    let truncated: String = values.chars().take(max_length).collect();
                    format!("{}{}", truncated, mark)
                } else {
                    values
                };
                format!("{}{}  [{}]", name, value, values)
            }
        }
    }

    /// Multi-line Markdown summary used by `discover-option`.
    pub fn factsheet(&self) -> String {
        let mut output = vec![format!("# {}\n", self.fullname())];
        if let Some(value) = &self.value {
            output.push(format!("Current value: {}  ", value));
        }
        output.push(format!("Possible values: {}", self.values_hint()));

        let (title, body) = self.split_description();
        if let Some(title) = title {
            output.push(format!("\n## {}\n", title));
        }
        if let Some(body) = body {
            output.push(body);
        }
        output.join("\n")
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// Option and module names: non-empty, no colons, no whitespace.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::format(name, "name must not be empty"));
    }
    if name.contains(':') {
        return Err(Error::format(name, "character ':' is not allowed in names"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::format(name, "whitespace is not allowed in names"));
    }
    if name == "*" || name == "**" {
        return Err(Error::format(name, "wildcards are not allowed in names"));
    }
    Ok(())
}
