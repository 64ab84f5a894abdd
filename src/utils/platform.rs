//! Platform-specific helpers: executable names, home directory and path expansion.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the git executable name for the current platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Gets the home directory path for the current user.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine home directory.\n\n\
            Set the HOME environment variable (or USERPROFILE on Windows)"
        )
    })
}

/// Resolves a path string with `~` and environment variable expansion.
///
/// # Errors
///
/// Fails when the path references an undefined environment variable.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| {
        let platform_vars = if is_windows() {
            "Common Windows variables: $USERPROFILE, $APPDATA, $TEMP"
        } else {
            "Common Unix variables: $HOME, $USER, $TMP"
        };
        format!("Failed to expand environment variables in path: {path}\n\n{platform_vars}")
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
