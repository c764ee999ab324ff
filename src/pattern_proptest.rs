//! Property-based tests for name resolution and option literal parsing.

#[cfg(test)]
mod proptest_tests {
    use crate::option::value::{parse_boolean, parse_integer};
    use crate::pattern::{Pattern, Specificity};
    use proptest::prelude::*;

    fn name_segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    fn qualified_name() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(name_segment(), 2..5)
    }

    proptest! {
        /// Property: an exact pattern matches exactly its own name
        #[test]
        fn exact_pattern_matches_itself(parts in qualified_name()) {
            let name = parts.join(":");
            let pattern = Pattern::parse(&name).unwrap();
            prop_assert!(pattern.matches(&name));
            prop_assert_eq!(pattern.specificity(), Specificity::ExactRepositoryExactPath);
            let longer = format!("{}:extra", name);
            prop_assert!(!pattern.matches(&longer));
        }

        /// Property: `**` matches everything `*` matches, and the prefix itself
        #[test]
        fn descendants_include_children(parts in qualified_name(), child in name_segment()) {
            let prefix = parts.join(":");
            let name = format!("{}:{}", prefix, child);
            let children = Pattern::parse(&format!("{}:*", prefix)).unwrap();
            let descendants = Pattern::parse(&format!("{}:**", prefix)).unwrap();
            prop_assert!(children.matches(&name));
            prop_assert!(descendants.matches(&name));
            prop_assert!(descendants.matches(&prefix));
            prop_assert!(!children.matches(&prefix));
        }

        /// Property: emptying a segment never loses matches
        #[test]
        fn empty_segment_generalizes(parts in qualified_name(), index in 0usize..4) {
            let index = index % parts.len();
            let name = parts.join(":");
            let mut generalized = parts.clone();
            generalized[index] = String::new();
            let pattern = Pattern::parse(&generalized.join(":")).unwrap();
            prop_assert!(pattern.matches(&name));
            prop_assert!(pattern.specificity() < Specificity::ExactRepositoryExactPath);
        }

        /// Property: integer literals round-trip through every base
        #[test]
        fn integer_bases_agree(value in any::<i32>()) {
            let value = i64::from(value);
            let magnitude = value.unsigned_abs();
            let sign = if value < 0 { "-" } else { "" };
            prop_assert_eq!(parse_integer(&value.to_string()), Some(value));
            prop_assert_eq!(parse_integer(&format!("{}0x{:x}", sign, magnitude)), Some(value));
            prop_assert_eq!(parse_integer(&format!("{}0o{:o}", sign, magnitude)), Some(value));
            prop_assert_eq!(parse_integer(&format!("{}0b{:b}", sign, magnitude)), Some(value));
        }

        /// Property: boolean parsing ignores letter case
        #[test]
        fn boolean_parsing_ignores_case(literal in "[tT][rR][uU][eE]|[yY][eE][sS]|[fF][aA][lL][sS][eE]|[nN][oO]") {
            let expected = matches!(literal.to_lowercase().as_str(), "true" | "yes");
            prop_assert_eq!(parse_boolean(&literal), Some(expected));
        }
    }
}
