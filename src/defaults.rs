//! Default values for lbuild configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Project configuration file looked up when `-c/--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "project.yaml";

/// Repository definition file.
pub const REPOSITORY_FILENAME: &str = "repo.yaml";

/// Module definition file searched below a repository by default.
pub const MODULE_FILENAME: &str = "module.yaml";

/// Returns the default cache root directory for fetched repositories.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/lbuild` (XDG Base Directory)
/// - macOS: `~/Library/Caches/lbuild`
/// - Windows: `{FOLDERID_LocalAppData}\lbuild`
///
/// Falls back to `.lbuild-cache` in the current directory if the platform
/// cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `LBUILD_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".lbuild-cache"))
        .join("lbuild")
}
