//! Thin wrappers around the system `git` command.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

/// Clone a repository at a specific ref using a shallow clone.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Any authentication configured in ~/.gitconfig
pub fn clone_shallow(url: &str, ref_name: &str, target_dir: &Path) -> Result<()> {
    // git refuses to clone into a non-empty directory
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("git clone --depth=1 --branch {} {}", ref_name, url);
    let output = Command::new("git")
        .args(["clone", "--depth=1", "--branch", ref_name, url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            r#ref: ref_name.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have an SSH key added to ssh-agent \
                or git credentials configured.\n\
                Error: {}",
                stderr
            )
        } else {
            stderr.to_string()
        };
        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: ref_name.to_string(),
            message,
        });
    }
    Ok(())
}

/// Move an existing checkout to the current head of `ref_name`.
pub fn fetch(url: &str, ref_name: &str, checkout: &Path) -> Result<()> {
    run(url, checkout, &["fetch", "--depth=1", "origin", ref_name])?;
    run(url, checkout, &["reset", "--hard", "FETCH_HEAD"])?;
    Ok(())
}

fn run(url: &str, checkout: &Path, args: &[&str]) -> Result<Output> {
    let command = args.join(" ");
    debug!("git -C {} {}", checkout.display(), command);
    let output = Command::new("git")
        .arg("-C")
        .arg(checkout)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            url: url.to_string(),
            stderr: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

/// Cache directory of a checkout of `url` at `ref_name`.
///
/// Characters that are not portable in file names are replaced by `_`, so
/// the directory name stays readable.
pub fn url_to_cache_path(cache_root: &Path, url: &str, ref_name: &str) -> PathBuf {
    let sanitize = |text: &str| -> String {
        text.trim_end_matches('/')
            .trim_end_matches(".git")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    cache_root.join(format!("{}@{}", sanitize(url), sanitize(ref_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_to_cache_path() {
        let path = url_to_cache_path(
            Path::new("/cache"),
            "https://example.com/org/lib.git",
            "main",
        );
        assert_eq!(path, PathBuf::from("/cache/https___example.com_org_lib@main"));
    }

    #[test]
    fn test_url_to_cache_path_with_slashes_in_ref() {
        let path = url_to_cache_path(Path::new("/cache"), "git@host:lib", "feature/x");
        assert_eq!(path.parent(), Some(Path::new("/cache")));
        assert!(path.ends_with("git_host_lib@feature_x"));
    }

    #[test]
    fn test_url_to_cache_path_different_refs() {
        let root = Path::new("/cache");
        assert_ne!(
            url_to_cache_path(root, "https://example.com/lib", "v1"),
            url_to_cache_path(root, "https://example.com/lib", "v2")
        );
    }
}
