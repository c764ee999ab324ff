//! Literal parsing for option values.
//!
//! Raw values arrive as strings from the configuration file and the command
//! line. These helpers turn them into typed values or report that they are
//! outside the accepted syntax.

/// Parse a boolean literal.
///
/// Accepts `true`, `yes`, `1` and `false`, `no`, `0` in any letter case.
pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an integer literal in any base.
///
/// Supports an optional sign, the `0x`, `0o` and `0b` prefixes (any letter
/// case) and single underscores between digits. Decimal literals with a
/// leading zero are rejected unless every digit is zero, so `010` is not
/// silently read as ten.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let literal = raw.trim();
    let (negative, unsigned) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest.trim_start_matches('_'))
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest.trim_start_matches('_'))
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest.trim_start_matches('_'))
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    if radix == 10 && digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0')
    {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean_true_literals() {
        for literal in ["true", "True", "TRUE", "yes", "Yes", "YES", "1"] {
            assert_eq!(parse_boolean(literal), Some(true), "literal {literal}");
        }
    }

    #[test]
    fn test_parse_boolean_false_literals() {
        for literal in ["false", "False", "FALSE", "no", "No", "NO", "0"] {
            assert_eq!(parse_boolean(literal), Some(false), "literal {literal}");
        }
    }

    #[test]
    fn test_parse_boolean_rejects_other_literals() {
        for literal in ["", "on", "off", "2", "y", "n", "truth"] {
            assert_eq!(parse_boolean(literal), None, "literal {literal}");
        }
    }

    #[test]
    fn test_parse_integer_bases() {
        assert_eq!(parse_integer("255"), Some(255));
        assert_eq!(parse_integer("0xff"), Some(255));
        assert_eq!(parse_integer("0XFF"), Some(255));
        assert_eq!(parse_integer("0o377"), Some(255));
        assert_eq!(parse_integer("0b1111_1111"), Some(255));
        assert_eq!(parse_integer("1_000"), Some(1000));
    }

    #[test]
    fn test_parse_integer_signs() {
        assert_eq!(parse_integer("-12"), Some(-12));
        assert_eq!(parse_integer("+12"), Some(12));
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("000"), Some(0));
    }

    #[test]
    fn test_parse_integer_rejects_malformed() {
        for literal in ["", "-", "0x", "12a", "010", "1__0", "_1", "1_", "0b2", "1.5", "abc"] {
            assert_eq!(parse_integer(literal), None, "literal {literal}");
        }
    }

    #[test]
    fn test_parse_integer_range() {
        assert_eq!(parse_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_integer("9223372036854775808"), None);
    }
}
