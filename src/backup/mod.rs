//! Backups of destination files overwritten by a run.
//!
//! Each run that requests backups owns one [`BackupSet`], a directory under the
//! destination root:
//!
//! ```text
//! <dest>/.bldrx/backups/<template>-<YYYYmmddHHMMSS>/<relative path>
//! ```
//!
//! The directory is created lazily when the first file is backed up, so a run
//! that overwrites nothing leaves no trace. Backups keep the relative layout of
//! the destination and preserve file permissions.
//!
//! In atomic mode the backup copy doubles as the restore source for rollback.
//! A rolled-back run discards its backup set, including the directories it
//! created, so the destination ends up exactly as it was.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::{BACKUP_TIMESTAMP_FORMAT, BACKUPS_DIR, TOOL_NAMESPACE};
use crate::utils::fs::ensure_parent_dir;
use crate::utils::path_validation::{destination_path, ensure_within_root};

/// Backup directory for a single run.
#[derive(Debug, Clone)]
pub struct BackupSet {
    destination_root: PathBuf,
    root: PathBuf,
    created: bool,
    /// Directories created for backups, shallowest first
    created_dirs: Vec<PathBuf>,
}

impl BackupSet {
    /// Computes the backup directory for `template_name` using the current time.
    pub fn new(destination_root: &Path, template_name: &str) -> Self {
        let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        Self::with_stamp(destination_root, template_name, &stamp)
    }

    /// Computes the backup directory with an explicit timestamp suffix.
    pub fn with_stamp(destination_root: &Path, template_name: &str, stamp: &str) -> Self {
        let root = destination_root
            .join(TOOL_NAMESPACE)
            .join(BACKUPS_DIR)
            .join(format!("{template_name}-{stamp}"));
        Self {
            destination_root: destination_root.to_path_buf(),
            root,
            created: false,
            created_dirs: Vec::new(),
        }
    }

    /// The directory holding this run's backups.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether at least one file has been backed up.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created
    }

    /// Directories this set has created so far, shallowest first.
    #[must_use]
    pub fn created_dirs(&self) -> &[PathBuf] {
        &self.created_dirs
    }

    /// Where the backup of `rel` lives.
    pub fn backup_path(&self, rel: &Path) -> Result<PathBuf> {
        destination_path(&self.root, rel)
    }

    /// Copies `existing` into the set under `rel`, preserving permissions.
    ///
    /// Returns the path of the backup copy.
    pub fn backup(&mut self, rel: &Path, existing: &Path) -> Result<PathBuf> {
        let target = self.backup_path(rel)?;
        if !self.created {
            info!("Creating backup set at {}", self.root.display());
            self.created = true;
        }
        ensure_within_root(&self.destination_root, &target)?;
        if let Some(parent) = target.parent() {
            let missing: Vec<PathBuf> = parent
                .ancestors()
                .take_while(|ancestor| !ancestor.exists())
                .map(Path::to_path_buf)
                .collect();
            ensure_parent_dir(&target)?;
            self.created_dirs.extend(missing.into_iter().rev());
        }

        fs::copy(existing, &target).with_context(|| {
            format!("Failed to back up {} to {}", existing.display(), target.display())
        })?;

        let permissions = fs::metadata(existing)
            .with_context(|| format!("Failed to read metadata of {}", existing.display()))?
            .permissions();
        fs::set_permissions(&target, permissions).context("Failed to set backup permissions")?;

        debug!("Backed up {} to {}", existing.display(), target.display());
        Ok(target)
    }

    /// Deletes the backup copies listed in `copies` and every directory this set
    /// created, deepest first. Used when a run is rolled back.
    pub fn discard(&mut self, copies: &[&Path]) {
        for copy in copies {
            match fs::remove_file(copy) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!("Failed to remove backup {}: {}", copy.display(), err),
            }
        }
        for dir in self.created_dirs.drain(..).rev() {
            if let Err(err) = fs::remove_dir(&dir) {
                warn!("Failed to remove backup directory {}: {}", dir.display(), err);
            }
        }
        self.created = false;
    }

    /// Moves the backup of `rel` back to `final_path`.
    ///
    /// Falls back to copying when a rename is not possible.
    pub fn restore(&self, rel: &Path, final_path: &Path) -> Result<()> {
        let source = self.backup_path(rel)?;
        restore_file(&source, final_path)
    }
}

/// Moves `source` over `target`, copying instead when renaming fails.
pub(crate) fn restore_file(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    ensure_parent_dir(target)?;
    fs::copy(source, target).with_context(|| {
        format!("Failed to restore {} from {}", target.display(), source.display())
    })?;
    Ok(())
}
