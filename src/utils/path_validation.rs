//! Destination path validation.
//!
//! Every path the engine writes to is computed as `destination_root` joined with
//! a template-relative path. These helpers guarantee the result stays underneath
//! the root, both lexically and after symlinks on disk are resolved.

use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::core::BldrxError;

/// Validates that a relative path contains only normal components.
///
/// # Errors
///
/// Returns [`BldrxError::UnsafePath`] for absolute paths, prefixes, or any `..`
/// component.
pub fn validate_no_traversal(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(BldrxError::UnsafePath {
                    path: path.display().to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Joins a template-relative path onto the destination root after validation.
pub fn destination_path(root: &Path, relative: &Path) -> Result<PathBuf> {
    validate_no_traversal(relative)?;
    Ok(root.join(relative))
}

/// Checks that `path` resolves underneath `root` on disk, following symlinks
/// that already exist. Must hold for every path about to be written or deleted.
///
/// # Errors
///
/// Returns [`BldrxError::UnsafePath`] when a symlinked directory (or the file
/// itself) points outside the root, or when a dangling symlink is in the way.
pub fn ensure_within_root(root: &Path, path: &Path) -> Result<()> {
    let unsafe_path = || BldrxError::UnsafePath {
        path: path.display().to_string(),
    };
    let resolved_root = resolve_existing(root).ok_or_else(unsafe_path)?;
    let resolved = resolve_existing(path).ok_or_else(unsafe_path)?;
    if resolved.starts_with(&resolved_root) {
        Ok(())
    } else {
        tracing::warn!("{} resolves to {}", path.display(), resolved.display());
        Err(unsafe_path().into())
    }
}

/// Canonicalizes the deepest ancestor of `path` present on disk and appends the
/// components that do not exist yet.
///
/// Returns `None` when an ancestor is present but cannot be canonicalized,
/// such as a dangling symlink.
fn resolve_existing(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        if fs::symlink_metadata(ancestor).is_ok() {
            let mut resolved = fs::canonicalize(ancestor).ok()?;
            for component in missing.iter().rev() {
                resolved.push(component);
            }
            return Some(resolved);
        }
        missing.push(ancestor.file_name()?.to_os_string());
    }
    let mut resolved = std::env::current_dir().ok()?;
    for component in missing.iter().rev() {
        resolved.push(component);
    }
    Some(resolved)
}
