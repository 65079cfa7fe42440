//! XDG-style path utilities for configuration and cache directories.
//!
//! XDG Base Directory conventions are preferred over OS-specific locations
//! so the config and cache land in the same place on every platform.

use std::path::PathBuf;

const APP_DIR: &str = "xcs";

/// Returns the configuration directory for xcs.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/xcs` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/xcs` otherwise
///
/// # Panics
///
/// Panics if the home directory cannot be determined.
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME").map_or_else(
        |_| home_dir().join(".config").join(APP_DIR),
        |xdg| PathBuf::from(xdg).join(APP_DIR),
    )
}

/// Returns the cache directory for xcs.
///
/// Resolution order:
/// 1. `$XDG_CACHE_HOME/xcs` if `XDG_CACHE_HOME` is set
/// 2. `~/.cache/xcs` otherwise
///
/// # Panics
///
/// Panics if the home directory cannot be determined.
pub fn cache_dir() -> PathBuf {
    std::env::var("XDG_CACHE_HOME").map_or_else(
        |_| home_dir().join(".cache").join(APP_DIR),
        |xdg| PathBuf::from(xdg).join(APP_DIR),
    )
}

#[allow(clippy::expect_used)]
fn home_dir() -> PathBuf {
    dirs::home_dir().expect("Failed to determine home directory")
}
