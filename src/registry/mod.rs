//! Installing and uninstalling user templates.
//!
//! User templates live in the user root (see
//! [`GlobalConfig::template_roots`](crate::config::GlobalConfig::template_roots)).
//! Installation is a plain recursive copy with no transactional guarantees.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::core::BldrxError;
use crate::utils::fs::{copy_dir, ensure_dir, remove_dir_all};

/// Copies the directory `src` into `user_root` as template `name`.
///
/// `name` defaults to the source directory's name. With `wrap`, the source
/// folder itself becomes the single child of the installed template
/// (`<user_root>/<name>/<src name>/...`), which preserves a top-level folder
/// such as `.github` at apply time. Without it, the contents of `src` are the
/// template.
///
/// Returns the installed template directory.
///
/// # Errors
///
/// - [`BldrxError::InvalidTemplateSource`] when `src` is not a directory
/// - [`BldrxError::UnsafePath`] when `name` is not a single plain path component
/// - [`BldrxError::TemplateAlreadyExists`] when the target exists and `force` is not set
pub fn install_user_template(
    user_root: &Path,
    src: &Path,
    name: Option<&str>,
    force: bool,
    wrap: bool,
) -> Result<PathBuf> {
    if !src.is_dir() {
        return Err(BldrxError::InvalidTemplateSource {
            path: src.display().to_string(),
        }
        .into());
    }

    let src_name = source_name(src)?;
    let name = name.map_or_else(|| src_name.clone(), str::to_string);
    if !is_template_name(&name) {
        return Err(BldrxError::UnsafePath {
            path: name,
        }
        .into());
    }
    let target = user_root.join(&name);

    if target.exists() {
        if !force {
            return Err(BldrxError::TemplateAlreadyExists {
                name,
            }
            .into());
        }
        info!("Replacing existing user template '{}'", name);
        remove_dir_all(&target)?;
    }

    ensure_dir(user_root)?;
    if wrap {
        copy_dir(src, &target.join(&src_name))?;
    } else {
        copy_dir(src, &target)?;
    }

    info!("Installed template '{}' to {}", name, target.display());
    Ok(target)
}

/// Removes the user template `name`.
///
/// # Errors
///
/// [`BldrxError::UserTemplateNotFound`] when no such template is installed.
pub fn uninstall_user_template(user_root: &Path, name: &str) -> Result<()> {
    let target = user_root.join(name);
    if !is_template_name(name) || !target.is_dir() {
        return Err(BldrxError::UserTemplateNotFound {
            name: name.to_string(),
        }
        .into());
    }

    remove_dir_all(&target)?;
    info!("Uninstalled template '{}'", name);
    Ok(())
}

/// Whether `name` names a direct child of the user root (no `.`, `..` or separators).
fn is_template_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

/// The final component of `src`, resolving `.` and relative paths first.
fn source_name(src: &Path) -> Result<String> {
    let resolved = if src.file_name().is_some() {
        src.to_path_buf()
    } else {
        src.canonicalize()?
    };
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            BldrxError::InvalidTemplateSource {
                path: src.display().to_string(),
            }
            .into()
        })
}
