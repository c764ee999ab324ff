//! # Error Suggestions
//!
//! Helper functions for error messages that carry hints. Errors should say
//! what went wrong and how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Error for a missing project configuration file.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a project.yaml file in your project root\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the LBUILD_CONFIG environment variable",
        path = path.display()
    )
}

/// Error for a command that needs fetched repositories before `init` ran.
pub fn repositories_not_initialized(cache_root: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Remote repositories are not available in {cache}\n\n\
         hint: Run 'lbuild init' to fetch them\n\
         hint: Use --cache-root to point at an existing cache",
        cache = cache_root.display()
    )
}

/// Error for a `-D` argument without `=`.
///
/// Wraps [`Error::Argument`] so the binary exits with the usage code.
pub fn malformed_define(argument: &str) -> anyhow::Error {
    anyhow::Error::new(Error::Argument {
        message: format!(
            "malformed option definition '{argument}'\n\n\
             hint: Use -D <pattern>=<value>, e.g. -D ':target=hosted'\n\
             hint: Patterns may use '*' and '**' as the last path segment"
        ),
    })
}

/// Pick the closest candidate within an edit distance of two.
pub fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];
    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_len]
}
