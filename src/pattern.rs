//! # Name Resolution
//!
//! Repositories, modules and options share one colon-separated namespace:
//! `repo`, `repo:module`, `repo:module:submodule`, `repo:module:option`.
//! Selectors and overrides address entities in that namespace with
//! patterns:
//!
//! - an exact segment matches only that literal name,
//! - an empty segment matches any single name at that position,
//! - a trailing `*` matches the direct children of the preceding path,
//! - a trailing `**` matches the preceding path and all its descendants.
//!
//! Matching is total: a pattern that addresses nothing yields an empty
//! result and the caller decides whether that is an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Empty segment.
    Any,
    Exact(String),
}

impl Segment {
    fn matches(&self, name: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(exact) => exact == name,
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Segment::Exact(_))
    }
}

/// Wildcard closing a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    None,
    /// `*`
    Children,
    /// `**`
    Descendants,
}

/// How precisely a pattern addresses its targets, least specific first.
///
/// The repository is the first segment; the path is everything after it,
/// including the option name for option overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    WildcardRepositoryWildcardPath,
    WildcardRepositoryExactPath,
    ExactRepositoryWildcardPath,
    ExactRepositoryExactPath,
}

/// A parsed selector or override pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    tail: Tail,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::format(source, "pattern must not be empty"));
        }

        let parts: Vec<&str> = source.split(':').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        let mut tail = Tail::None;
        for (index, part) in parts.iter().enumerate() {
            match *part {
                "*" | "**" if index != last => {
                    return Err(Error::format(
                        source,
                        format!("wildcard '{}' is only allowed as the last segment", part),
                    ));
                }
                "*" => tail = Tail::Children,
                "**" => tail = Tail::Descendants,
                "" => segments.push(Segment::Any),
                part if part.contains('*') => {
                    return Err(Error::format(
                        source,
                        format!("segment '{}' mixes a wildcard with a name", part),
                    ));
                }
                part if part.chars().any(char::is_whitespace) => {
                    return Err(Error::format(
                        source,
                        format!("segment '{}' contains whitespace", part),
                    ));
                }
                part => segments.push(Segment::Exact(part.to_string())),
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            tail,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tail(&self) -> Tail {
        self.tail
    }

    /// Number of colon-separated parts as written, wildcards included.
    pub fn depth(&self) -> usize {
        self.segments.len() + usize::from(self.tail != Tail::None)
    }

    /// Whether the fully-qualified `name` is addressed by this pattern.
    pub fn matches(&self, name: &str) -> bool {
        let parts: Vec<&str> = name.split(':').collect();
        let prefix = self.segments.len();
        let length_ok = match self.tail {
            Tail::None => parts.len() == prefix,
            Tail::Children => parts.len() == prefix + 1,
            Tail::Descendants => parts.len() >= prefix,
        };
        length_ok
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| segment.matches(part))
    }

    pub fn specificity(&self) -> Specificity {
        let repository_exact = self.segments.first().is_some_and(Segment::is_exact);
        let path_exact =
            self.tail == Tail::None && self.segments.iter().skip(1).all(Segment::is_exact);
        match (repository_exact, path_exact) {
            (true, true) => Specificity::ExactRepositoryExactPath,
            (true, false) => Specificity::ExactRepositoryWildcardPath,
            (false, true) => Specificity::WildcardRepositoryExactPath,
            (false, false) => Specificity::WildcardRepositoryWildcardPath,
        }
    }

    /// Names in `namespace` matched by this pattern, in sorted order.
    pub fn select<'a, I>(&self, namespace: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selected: Vec<&str> = namespace
            .into_iter()
            .filter(|name| self.matches(name))
            .collect();
        selected.sort_unstable();
        selected.dedup();
        selected
    }

    /// Entries of a name-keyed namespace matched by this pattern.
    pub fn resolve<'a, T>(&self, namespace: &'a BTreeMap<String, T>) -> Vec<(&'a str, &'a T)> {
        namespace
            .iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(name, entity)| (name.as_str(), entity))
            .collect()
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a fully-qualified module name into repository and module path.
pub fn split_repository(fullname: &str) -> (&str, &str) {
    fullname.split_once(':').unwrap_or((fullname, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules() -> BTreeMap<String, ()> {
        [
            "repo1:module1",
            "repo1:module2",
            "repo1:module2:submodule3",
            "repo1:module2:submodule3:subsubmodule1",
            "repo2:module1",
        ]
        .into_iter()
        .map(|name| (name.to_string(), ()))
        .collect()
    }

    fn names(pattern: &str) -> Vec<String> {
        let modules = modules();
        Pattern::parse(pattern)
            .unwrap()
            .resolve(&modules)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    #[test]
    fn test_exact_pattern() {
        assert_eq!(names("repo1:module2"), vec!["repo1:module2"]);
        assert!(names("repo1:module3").is_empty());
    }

    #[test]
    fn test_empty_segment_matches_any_repository() {
        assert_eq!(names(":module1"), vec!["repo1:module1", "repo2:module1"]);
    }

    #[test]
    fn test_double_star_matches_everything_below() {
        assert_eq!(names(":**").len(), 5);
        assert_eq!(
            names("repo1:module2:**"),
            vec![
                "repo1:module2",
                "repo1:module2:submodule3",
                "repo1:module2:submodule3:subsubmodule1"
            ]
        );
    }

    #[test]
    fn test_single_star_matches_direct_children_only() {
        assert_eq!(names("repo1:module2:*"), vec!["repo1:module2:submodule3"]);
        assert_eq!(names("repo1:*"), vec!["repo1:module1", "repo1:module2"]);
    }

    #[test]
    fn test_wildcard_in_middle_is_rejected() {
        assert!(matches!(
            Pattern::parse("repo1:**:module"),
            Err(Error::Format { .. })
        ));
        assert!(matches!(
            Pattern::parse("repo1:mod*"),
            Err(Error::Format { .. })
        ));
        assert!(matches!(Pattern::parse(""), Err(Error::Format { .. })));
    }

    #[test]
    fn test_specificity_ordering() {
        let spec = |p: &str| Pattern::parse(p).unwrap().specificity();
        assert_eq!(spec("repo1:other:foo"), Specificity::ExactRepositoryExactPath);
        assert_eq!(spec("repo1::foo"), Specificity::ExactRepositoryWildcardPath);
        assert_eq!(spec(":other:foo"), Specificity::WildcardRepositoryExactPath);
        assert_eq!(spec("::foo"), Specificity::WildcardRepositoryWildcardPath);
        assert_eq!(spec("repo1:**"), Specificity::ExactRepositoryWildcardPath);
        assert!(spec("repo1:other:foo") > spec("repo1::foo"));
        assert!(spec("repo1::foo") > spec(":other:foo"));
        assert!(spec(":other:foo") > spec("::foo"));
    }

    #[test]
    fn test_option_patterns() {
        let pattern = Pattern::parse("repo1::bar").unwrap();
        assert!(pattern.matches("repo1:other:bar"));
        assert!(!pattern.matches("repo1:bar"));
        assert!(!pattern.matches("repo1:other:sub:bar"));
        assert_eq!(pattern.depth(), 3);
        assert_eq!(Pattern::parse(":*").unwrap().depth(), 2);
    }

    #[test]
    fn test_select_sorts_and_dedups() {
        let pattern = Pattern::parse(":module1").unwrap();
        let selected = pattern.select(["repo2:module1", "repo1:module1", "repo2:module1"]);
        assert_eq!(selected, vec!["repo1:module1", "repo2:module1"]);
    }

    #[test]
    fn test_split_repository() {
        assert_eq!(split_repository("repo1:module2:sub"), ("repo1", "module2:sub"));
        assert_eq!(split_repository("repo1"), ("repo1", ""));
    }
}
