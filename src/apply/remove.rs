//! Removing a template's outputs from a destination tree.
//!
//! Removal is not transactional: each deletion happens as its result is
//! yielded. Only files are removed; directories are left in place.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::planner::{TemplateEntry, TemplateWalk};
use crate::core::{Action, ActionResult};
use crate::source::TemplateSource;
use crate::utils::path_validation::{destination_path, ensure_within_root};

/// Lazy stream of removal results.
///
/// | Condition | Action |
/// |-----------|--------|
/// | output does not exist | `missing` |
/// | no `force` | `skipped` |
/// | dry run | `would-remove` |
/// | otherwise | `removed` |
pub struct RemoveRun {
    destination_root: PathBuf,
    walk: TemplateWalk,
    force: bool,
    dry_run: bool,
    done: bool,
}

impl RemoveRun {
    pub fn new(source: &TemplateSource, destination_root: &Path, force: bool, dry_run: bool) -> Self {
        Self {
            destination_root: destination_root.to_path_buf(),
            walk: TemplateWalk::new(&source.root_path),
            force,
            dry_run,
            done: false,
        }
    }

    fn remove(&self, entry: &TemplateEntry) -> Result<ActionResult> {
        let out_path = destination_path(&self.destination_root, &entry.output_rel_path())?;

        let action = if !out_path.exists() {
            Action::Missing
        } else if !self.force {
            Action::Skipped
        } else if self.dry_run {
            Action::WouldRemove
        } else {
            // Removing a symlink deletes the link, so only the directory must resolve inside.
            if let Some(parent) = out_path.parent() {
                ensure_within_root(&self.destination_root, parent)?;
            }
            fs::remove_file(&out_path)
                .with_context(|| format!("Failed to remove {}", out_path.display()))?;
            info!("Removed {}", out_path.display());
            Action::Removed
        };

        Ok(ActionResult::new(out_path, action))
    }
}

impl Iterator for RemoveRun {
    type Item = Result<ActionResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let entry = match self.walk.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(entry)) => entry,
            };
            if entry.is_directory {
                continue;
            }
            let result = self.remove(&entry);
            if result.is_err() {
                self.done = true;
            }
            return Some(result);
        }
    }
}

impl std::iter::FusedIterator for RemoveRun {}
