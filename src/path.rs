//! Path manipulation utilities for lbuild

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};

/// Match a relative path against a glob pattern.
///
/// `*` does not cross directory separators, `**` does.
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    Ok(pattern.matches_with(path, options))
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// Returns `None` when `..` climbs above the start of a relative path.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
        }
    }
    Some(normalized)
}

/// Resolve a destination below an output root.
///
/// Returns the normalized absolute path and the path relative to the root.
/// Destinations that are absolute or leave the root are rejected.
pub fn resolve_output(root: &Path, destination: &str) -> Result<(PathBuf, PathBuf)> {
    let relative = Path::new(destination);
    if relative.is_absolute() || relative.has_root() {
        return Err(Error::Path {
            message: format!("output path '{}' must be relative", destination),
        });
    }
    let relative = match normalize(relative) {
        Some(relative) if !relative.as_os_str().is_empty() => relative,
        _ => {
            return Err(Error::Path {
                message: format!("output path '{}' leaves the output directory", destination),
            })
        }
    };
    Ok((absolute_root(root)?.join(&relative), relative))
}

/// Absolute, lexically normalized form of an output root.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(root)?;
    Ok(normalize(&root).unwrap_or(root))
}
