//! Template rendering.
//!
//! Modules emit files through a [`Renderer`]. The engine ships a small
//! substitution renderer: `${name}` is replaced by the value of the variable
//! `name`, `$$` produces a literal `$`. Variable names may be short option
//! names or fully-qualified ones (`${repo1:target}`).

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// Variables available to a template, by name.
pub type TemplateContext = BTreeMap<String, String>;

/// Turns template sources into output text.
pub trait Renderer: Send + Sync {
    /// Render `source`; `template` identifies it in error messages.
    fn render(&self, template: &str, source: &str, context: &TemplateContext) -> Result<String>;
}

/// `$$`, a well-formed `${name}`, or anything else opened by `${`.
const PLACEHOLDER: &str = r"\$\$|\$\{\s*([A-Za-z_][A-Za-z0-9_:\-]*)\s*\}|\$\{[^}]*\}?";

/// `${name}` substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionRenderer;

impl Renderer for SubstitutionRenderer {
    fn render(&self, template: &str, source: &str, context: &TemplateContext) -> Result<String> {
        let mut failure: Option<Error> = None;
        let placeholder = Regex::new(PLACEHOLDER)?;
        let rendered = placeholder.replace_all(source, |caps: &Captures| {
            let whole = &caps[0];
            if whole == "$$" {
                return "$".to_string();
            }
            match caps.get(1) {
                Some(name) => match context.get(name.as_str()) {
                    Some(value) => value.clone(),
                    None => {
                        failure.get_or_insert_with(|| Error::Template {
                            template: template.to_string(),
                            message: "undefined variable".to_string(),
                            variable: Some(name.as_str().to_string()),
                        });
                        String::new()
                    }
                },
                None => {
                    failure.get_or_insert_with(|| Error::Template {
                        template: template.to_string(),
                        message: format!("malformed placeholder '{}'", whole),
                        variable: None,
                    });
                    String::new()
                }
            }
        });
        match failure {
            Some(error) => Err(error),
            None => Ok(rendered.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        [
            ("target", "hosted"),
            ("repo1:target", "hosted"),
            ("size", "32"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_substitutes_short_and_qualified_names() {
        let rendered = SubstitutionRenderer
            .render("t", "target=${target} full=${ repo1:target } n=${size}", &context())
            .unwrap();
        assert_eq!(rendered, "target=hosted full=hosted n=32");
    }

    #[test]
    fn test_dollar_escape() {
        let rendered = SubstitutionRenderer
            .render("t", "cost: $$5, literal $${target}", &context())
            .unwrap();
        assert_eq!(rendered, "cost: $5, literal ${target}");
    }

    #[test]
    fn test_plain_text_untouched() {
        let source = "int main() { return $value; }";
        let rendered = SubstitutionRenderer.render("t", source, &context()).unwrap();
        assert_eq!(rendered, source);
    }

    #[test]
    fn test_undefined_variable_is_template_error() {
        let error = SubstitutionRenderer
            .render("gpio.hpp.in", "${pin_count}", &context())
            .unwrap_err();
        match error {
            Error::Template {
                template, variable, ..
            } => {
                assert_eq!(template, "gpio.hpp.in");
                assert_eq!(variable.as_deref(), Some("pin_count"));
            }
            other => panic!("Expected Template error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_placeholder_is_template_error() {
        let error = SubstitutionRenderer
            .render("t", "value: ${not closed", &context())
            .unwrap_err();
        assert!(error.is_template_error());
    }
}
