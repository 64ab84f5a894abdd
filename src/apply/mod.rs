//! Applying a template to a destination tree.
//!
//! [`ApplyRun`] is a lazy stream of [`ActionResult`]s: each call to `next`
//! plans and executes exactly one template entry, so the caller observes
//! progress as it happens. After yielding an error the stream ends.
//!
//! # Per-entry Decisions
//!
//! | Entry | Condition | Action |
//! |-------|-----------|--------|
//! | renderable | not valid UTF-8 | `skipped-binary` |
//! | renderable | output exists, no `force`, no merge | `skipped` |
//! | renderable | merging into an existing output that is not valid UTF-8 | `skipped-binary` |
//! | renderable | otherwise | `rendered` (merged when the output exists) |
//! | raw | output exists, no `force` | `skipped` |
//! | raw | NUL byte in the first 1024 bytes, no `force` | `skipped-binary` |
//! | raw | larger than 1,000,000 bytes, no `force` | `skipped-large` |
//! | raw | otherwise | `copied` |
//!
//! Dry runs report the `would-*` counterparts and never touch the filesystem.
//! Render errors surface in dry runs too.
//!
//! # Example
//!
//! ```rust,no_run
//! use bldrx::apply::{ApplyRequest, ApplyRun};
//! use bldrx::merge::MergeStrategy;
//! use bldrx::source::TemplateRoots;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let roots = TemplateRoots::new("~/.bldrx/templates", "/usr/share/bldrx/templates");
//! let request = ApplyRequest::new("python-cli", "my-project")
//!     .atomic(true)
//!     .merge_strategy(MergeStrategy::Marker);
//!
//! let mut run = ApplyRun::start(request, &roots)?;
//! for result in run.by_ref() {
//!     let result = result?;
//!     println!("{}: {}", result.action, result.path.display());
//! }
//! run.finish().await?;
//! # Ok(())
//! # }
//! ```

pub mod planner;
pub mod preview;
pub mod remove;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use planner::{RawClass, TemplateEntry, TemplateWalk, classify_raw, skip_existing};
pub use preview::{PreviewEntry, PreviewRun};
pub use remove::RemoveRun;

use crate::backup::BackupSet;
use crate::core::{Action, ActionResult};
use crate::git;
use crate::merge::MergeStrategy;
use crate::source::{TemplateRoots, TemplateSource};
use crate::templating::{Metadata, TemplateRenderer};
use crate::transaction::{TransactionManager, TransactionMode};
use crate::utils::path_validation::destination_path;
use planner::classify_raw_file;

/// Everything needed to apply one template to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub template_name: String,
    pub destination_root: PathBuf,
    pub metadata: Metadata,
    pub force: bool,
    pub dry_run: bool,
    pub backup: bool,
    pub atomic: bool,
    pub merge_strategy: MergeStrategy,
    pub commit_to_vcs: bool,
    pub commit_message: Option<String>,
    /// Override root searched before the user and packaged roots
    pub templates_dir: Option<PathBuf>,
}

impl ApplyRequest {
    pub fn new(template_name: impl Into<String>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            template_name: template_name.into(),
            destination_root: destination_root.into(),
            metadata: Metadata::new(),
            force: false,
            dry_run: false,
            backup: false,
            atomic: false,
            merge_strategy: MergeStrategy::None,
            commit_to_vcs: false,
            commit_message: None,
            templates_dir: None,
        }
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    #[must_use]
    pub const fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    #[must_use]
    pub const fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn commit_to_vcs(mut self, commit: bool) -> Self {
        self.commit_to_vcs = commit;
        self
    }

    #[must_use]
    pub fn commit_message(mut self, message: Option<String>) -> Self {
        self.commit_message = message;
        self
    }

    #[must_use]
    pub fn templates_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.templates_dir = dir;
        self
    }

    /// The commit message used by the commit hook.
    #[must_use]
    pub fn effective_commit_message(&self) -> String {
        self.commit_message
            .clone()
            .unwrap_or_else(|| format!("bldrx: apply template {}", self.template_name))
    }
}

/// Summary returned by [`ApplyRun::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Results that had not been consumed before `finish` was called
    pub results: Vec<ActionResult>,
    /// Number of files written during the whole run
    pub writes: usize,
    /// Whether the commit hook created a commit
    pub committed: bool,
}

/// A lazy, single-use stream of apply results.
pub struct ApplyRun {
    request: ApplyRequest,
    source: TemplateSource,
    renderer: TemplateRenderer,
    walk: TemplateWalk,
    /// `None` for dry runs
    transaction: Option<TransactionManager>,
    writes: usize,
    done: bool,
}

impl ApplyRun {
    /// Resolves the template and prepares the run. Nothing is written yet.
    ///
    /// # Errors
    ///
    /// [`BldrxError::TemplateNotFound`](crate::core::BldrxError::TemplateNotFound)
    /// when no root holds the template.
    pub fn start(request: ApplyRequest, roots: &TemplateRoots) -> Result<Self> {
        let roots = match &request.templates_dir {
            Some(dir) => roots.clone().with_override(Some(dir.clone())),
            None => roots.clone(),
        };
        let source = roots.resolve(&request.template_name)?;
        let renderer = TemplateRenderer::new(&source.root_path)?;
        let walk = TemplateWalk::new(&source.root_path);

        let transaction = if request.dry_run {
            None
        } else {
            let mode = if request.atomic {
                TransactionMode::Atomic
            } else {
                TransactionMode::Direct
            };
            let backups = request
                .backup
                .then(|| BackupSet::new(&request.destination_root, &request.template_name));
            Some(TransactionManager::new(&request.destination_root, mode, backups))
        };

        info!(
            "Applying template '{}' ({}) to {}{}",
            source.name,
            source.origin,
            request.destination_root.display(),
            if request.dry_run { " (dry run)" } else { "" }
        );

        Ok(Self {
            request,
            source,
            renderer,
            walk,
            transaction,
            writes: 0,
            done: false,
        })
    }

    #[must_use]
    pub const fn source(&self) -> &TemplateSource {
        &self.source
    }

    #[must_use]
    pub const fn request(&self) -> &ApplyRequest {
        &self.request
    }

    /// Number of files written so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Drains the remaining entries, then runs the commit hook when requested
    /// and at least one file was written.
    ///
    /// # Errors
    ///
    /// The first entry error, or
    /// [`BldrxError::VcsIntegrationFailure`](crate::core::BldrxError::VcsIntegrationFailure)
    /// from the commit hook.
    pub async fn finish(mut self) -> Result<ApplyOutcome> {
        let mut results = Vec::new();
        for result in self.by_ref() {
            results.push(result?);
        }

        let mut committed = false;
        if self.request.commit_to_vcs && self.writes > 0 {
            let message = self.request.effective_commit_message();
            git::commit_all(&self.request.destination_root, &message).await?;
            committed = true;
        } else if self.request.commit_to_vcs {
            debug!("Nothing was written, skipping commit");
        }

        Ok(ApplyOutcome {
            results,
            writes: self.writes,
            committed,
        })
    }

    fn process(&mut self, entry: &TemplateEntry) -> Result<Option<ActionResult>> {
        if entry.is_directory {
            if let Some(tx) = self.transaction.as_mut() {
                tx.create_dir(Path::new(&entry.relative_path))?;
            }
            return Ok(None);
        }

        let out_rel = entry.output_rel_path();
        let out_path = destination_path(&self.request.destination_root, &out_rel)?;
        let src_path = entry.source_path(&self.source.root_path);
        let exists = out_path.exists();

        let action = if entry.is_renderable {
            self.process_renderable(entry, &src_path, &out_rel, &out_path, exists)?
        } else {
            self.process_raw(&src_path, &out_rel, exists)?
        };

        debug!("{}: {}", action, out_path.display());
        Ok(Some(ActionResult::new(out_path, action)))
    }

    fn process_renderable(
        &mut self,
        entry: &TemplateEntry,
        src_path: &Path,
        out_rel: &Path,
        out_path: &Path,
        exists: bool,
    ) -> Result<Action> {
        let bytes = fs::read(src_path)
            .with_context(|| format!("Failed to read template: {}", src_path.display()))?;
        let Ok(body) = String::from_utf8(bytes) else {
            return Ok(self.dry_or(Action::SkippedBinary));
        };

        let merge = self.request.merge_strategy;
        if skip_existing(exists, self.request.force, merge) {
            return Ok(Action::Skipped);
        }

        let rendered = self.renderer.render(&entry.relative_path, &body, &self.request.metadata)?;

        let content = if exists && merge.is_merge() {
            let existing = fs::read(out_path)
                .with_context(|| format!("Failed to read existing file: {}", out_path.display()))?;
            let Ok(existing) = String::from_utf8(existing) else {
                warn!("Not merging into {}: existing content is not UTF-8", out_path.display());
                return Ok(self.dry_or(Action::SkippedBinary));
            };
            let file_name = out_rel
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            merge.merge(&existing, &rendered, &file_name)
        } else {
            rendered
        };

        let Some(tx) = self.transaction.as_mut() else {
            return Ok(Action::WouldRender);
        };

        tx.write(out_rel, content.as_bytes())?;
        self.writes += 1;
        Ok(Action::Rendered)
    }

    fn process_raw(&mut self, src_path: &Path, out_rel: &Path, exists: bool) -> Result<Action> {
        if skip_existing(exists, self.request.force, MergeStrategy::None) {
            return Ok(Action::Skipped);
        }

        if !self.request.force {
            match classify_raw_file(src_path)? {
                RawClass::Binary => return Ok(self.dry_or(Action::SkippedBinary)),
                RawClass::Large => return Ok(self.dry_or(Action::SkippedLarge)),
                RawClass::Text => {}
            }
        }

        let Some(tx) = self.transaction.as_mut() else {
            return Ok(Action::WouldCopy);
        };

        let bytes = fs::read(src_path)
            .with_context(|| format!("Failed to read template file: {}", src_path.display()))?;
        tx.write(out_rel, &bytes)?;
        self.writes += 1;
        Ok(Action::Copied)
    }

    /// The dry-run counterpart of `action` when this is a dry run.
    fn dry_or(&self, action: Action) -> Action {
        if self.request.dry_run {
            action.dry_run_variant()
        } else {
            action
        }
    }

    fn fail(&mut self, err: anyhow::Error) -> anyhow::Error {
        self.done = true;
        if let Some(tx) = self.transaction.as_mut() {
            tx.rollback();
        }
        err
    }
}

impl Iterator for ApplyRun {
    type Item = Result<ActionResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let entry = match self.walk.next() {
                None => {
                    self.done = true;
                    if let Some(tx) = self.transaction.as_mut() {
                        tx.commit();
                    }
                    return None;
                }
                Some(Err(err)) => return Some(Err(self.fail(err))),
                Some(Ok(entry)) => entry,
            };

            match self.process(&entry) {
                Ok(Some(result)) => return Some(Ok(result)),
                Ok(None) => {}
                Err(err) => return Some(Err(self.fail(err))),
            }
        }
    }
}

impl std::iter::FusedIterator for ApplyRun {}
