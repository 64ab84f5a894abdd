//! Execution of planned writes, directly or as an all-or-nothing transaction.
//!
//! The [`TransactionManager`] is the only component that mutates the
//! destination tree during an apply. It runs in one of two modes:
//!
//! - [`TransactionMode::Direct`]: each write goes straight to its final path,
//!   after an optional backup of the file it replaces.
//! - [`TransactionMode::Atomic`]: each write goes to a temporary file in the
//!   same directory and is renamed over the final path. Before the rename, the
//!   prior state of the path is recorded in [`TransactionState`]. If any write
//!   fails, every earlier write of the run is undone.
//!
//! # Rollback
//!
//! Rollback is best-effort. Replaced files are restored from their restore
//! source, newly created files are deleted and newly created directories are
//! removed deepest first when empty. Individual failures are logged and do not
//! stop the remaining restores.
//!
//! A restore source is the run's backup copy when backups were requested, and
//! otherwise a private snapshot next to the file that is deleted on commit.
//! Either way, every overwritten file can be put back.
//!
//! Only errors raised while the run executes trigger rollback; a crash leaves
//! whatever was already renamed into place.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::backup::{BackupSet, restore_file};
use crate::core::BldrxError;
use crate::utils::path_validation::{destination_path, ensure_within_root};

/// Suffix of rollback snapshot files.
const SNAPSHOT_SUFFIX: &str = ".bldrx-rollback";

/// How writes reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    Direct,
    Atomic,
}

/// Where the pre-run bytes of a replaced file can be recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSource {
    /// The copy in the run's backup set, which outlives the run
    Backup(PathBuf),
    /// A private sibling snapshot, deleted on commit
    Snapshot(PathBuf),
}

impl RestoreSource {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Backup(path) | Self::Snapshot(path) => path,
        }
    }
}

/// Everything an atomic run has touched so far.
#[derive(Debug, Default)]
pub struct TransactionState {
    /// Final paths that existed before the run, with their restore source
    pub replaced: Vec<(PathBuf, RestoreSource)>,
    /// Final paths that did not exist before the run
    pub created_files: Vec<PathBuf>,
    /// Directories created by the run, shallowest first
    pub created_dirs: Vec<PathBuf>,
}

impl TransactionState {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.created_files.is_empty() && self.created_dirs.is_empty()
    }
}

/// Applies writes for one run under a destination root.
#[derive(Debug)]
pub struct TransactionManager {
    destination_root: PathBuf,
    mode: TransactionMode,
    backups: Option<BackupSet>,
    state: TransactionState,
    finished: bool,
}

impl TransactionManager {
    pub fn new(destination_root: &Path, mode: TransactionMode, backups: Option<BackupSet>) -> Self {
        Self {
            destination_root: destination_root.to_path_buf(),
            mode,
            backups,
            state: TransactionState::default(),
            finished: false,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TransactionMode {
        self.mode
    }

    #[must_use]
    pub const fn state(&self) -> &TransactionState {
        &self.state
    }

    #[must_use]
    pub const fn backups(&self) -> Option<&BackupSet> {
        self.backups.as_ref()
    }

    /// Writes `content` to `rel` under the destination root.
    ///
    /// # Errors
    ///
    /// In atomic mode any failure rolls the run back and is returned as
    /// [`BldrxError::AtomicTransactionFailure`]. In direct mode the underlying
    /// error is returned and earlier writes stay in place.
    pub fn write(&mut self, rel: &Path, content: &[u8]) -> Result<()> {
        let final_path = destination_path(&self.destination_root, rel)?;
        match self.mode {
            TransactionMode::Direct => self.write_direct(rel, &final_path, content),
            TransactionMode::Atomic => {
                if let Err(err) = self.write_atomic(rel, &final_path, content) {
                    warn!("Write to {} failed, rolling back: {:#}", final_path.display(), err);
                    self.rollback();
                    return Err(BldrxError::AtomicTransactionFailure {
                        path: final_path.display().to_string(),
                        source: err.into(),
                    }
                    .into());
                }
                Ok(())
            }
        }
    }

    /// Creates the directory `rel` (and missing parents) under the destination root.
    pub fn create_dir(&mut self, rel: &Path) -> Result<()> {
        let path = destination_path(&self.destination_root, rel)?;
        let result = ensure_within_root(&self.destination_root, &path)
            .and_then(|()| self.create_dirs_recorded(&path));
        if let Err(err) = result {
            if self.mode == TransactionMode::Atomic {
                self.rollback();
                return Err(BldrxError::AtomicTransactionFailure {
                    path: path.display().to_string(),
                    source: err.into(),
                }
                .into());
            }
            return Err(err);
        }
        Ok(())
    }

    fn write_direct(&mut self, rel: &Path, final_path: &Path, content: &[u8]) -> Result<()> {
        ensure_within_root(&self.destination_root, final_path)?;
        if final_path.is_file() {
            if let Some(backups) = self.backups.as_mut() {
                backups.backup(rel, final_path)?;
            }
        }
        if let Some(parent) = final_path.parent() {
            self.create_dirs_recorded(parent)?;
        }
        fs::write(final_path, content)
            .with_context(|| format!("Failed to write {}", final_path.display()))?;
        debug!("Wrote {}", final_path.display());
        Ok(())
    }

    fn write_atomic(&mut self, rel: &Path, final_path: &Path, content: &[u8]) -> Result<()> {
        let parent = final_path
            .parent()
            .with_context(|| format!("Output path has no parent: {}", final_path.display()))?;
        ensure_within_root(&self.destination_root, final_path)?;
        self.create_dirs_recorded(parent)?;
        ensure_within_root(&self.destination_root, parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temporary file for {}", final_path.display()))?;
        temp.as_file().sync_all().context("Failed to sync temporary file")?;

        if final_path.is_dir() {
            anyhow::bail!("Output path is a directory: {}", final_path.display());
        }

        if final_path.exists() {
            let source = self.capture_restore_source(rel, final_path)?;
            self.state.replaced.push((final_path.to_path_buf(), source));
        } else {
            self.state.created_files.push(final_path.to_path_buf());
        }

        temp.persist(final_path).map_err(|err| err.error).with_context(|| {
            format!("Failed to move temporary file into place at {}", final_path.display())
        })?;
        debug!("Atomically replaced {}", final_path.display());
        Ok(())
    }

    fn capture_restore_source(&mut self, rel: &Path, final_path: &Path) -> Result<RestoreSource> {
        if let Some(backups) = self.backups.as_mut() {
            return Ok(RestoreSource::Backup(backups.backup(rel, final_path)?));
        }

        let parent = final_path.parent().unwrap_or(&self.destination_root);
        let file_name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let snapshot = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(SNAPSHOT_SUFFIX)
            .tempfile_in(parent)
            .with_context(|| format!("Failed to create rollback snapshot in {}", parent.display()))?
            .into_temp_path();
        // Until `keep`, dropping the temp path deletes a half-written snapshot.
        fs::copy(final_path, &snapshot).with_context(|| {
            format!("Failed to snapshot {} for rollback", final_path.display())
        })?;
        let snapshot = snapshot.keep().context("Failed to keep rollback snapshot")?;
        Ok(RestoreSource::Snapshot(snapshot))
    }

    /// Creates `dir` and any missing ancestors, recording each new directory.
    fn create_dirs_recorded(&mut self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        let missing: Vec<PathBuf> = dir
            .ancestors()
            .take_while(|ancestor| !ancestor.exists())
            .map(Path::to_path_buf)
            .collect();

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        if self.mode == TransactionMode::Atomic {
            self.state.created_dirs.extend(missing.into_iter().rev());
        }
        Ok(())
    }

    /// Undoes every recorded change. Does nothing in direct mode or once finished.
    pub fn rollback(&mut self) {
        if self.finished || self.mode == TransactionMode::Direct {
            return;
        }
        self.finished = true;
        let state = std::mem::take(&mut self.state);
        info!(
            "Rolling back {} replaced and {} created files",
            state.replaced.len(),
            state.created_files.len()
        );

        let mut restored_backups: Vec<&Path> = Vec::new();
        for (final_path, source) in state.replaced.iter().rev() {
            match restore_file(source.path(), final_path) {
                Ok(()) => {
                    if let RestoreSource::Backup(path) = source {
                        restored_backups.push(path.as_path());
                    }
                }
                Err(err) => warn!("Failed to restore {}: {:#}", final_path.display(), err),
            }
        }

        for path in state.created_files.iter().rev() {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!("Failed to remove {}: {}", path.display(), err),
            }
        }

        for dir in state.created_dirs.iter().rev() {
            if let Err(err) = fs::remove_dir(dir) {
                warn!("Failed to remove directory {}: {}", dir.display(), err);
            }
        }

        // Backups of files that could not be restored stay, and so do their directories.
        if let Some(backups) = self.backups.as_mut() {
            backups.discard(&restored_backups);
        }
    }

    /// Finalizes the run, discarding rollback snapshots.
    pub fn commit(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        for (_, source) in &self.state.replaced {
            if let RestoreSource::Snapshot(path) = source {
                if let Err(err) = fs::remove_file(path) {
                    warn!("Failed to remove rollback snapshot {}: {}", path.display(), err);
                }
            }
        }
        debug!("Committed changes under {}", self.destination_root.display());
    }
}

impl Drop for TransactionManager {
    fn drop(&mut self) {
        self.commit();
    }
}
