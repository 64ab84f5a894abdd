//! Per-entry actions reported by the apply, remove and preview result streams.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The logical action taken (or planned) for one template entry.
///
/// Serialized in kebab-case (`would-skip-binary`), which is also the
/// [`fmt::Display`] form printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// A renderable entry was rendered (and possibly merged) and written
    Rendered,
    /// A raw entry was copied verbatim
    Copied,
    /// The target already exists and no overwrite was authorized, or preview
    /// found identical content
    Skipped,
    /// The entry looks binary and was not written
    SkippedBinary,
    /// The entry exceeds the size threshold and was not written
    SkippedLarge,
    WouldRender,
    WouldCopy,
    WouldSkipBinary,
    WouldSkipLarge,
    /// Remove: the output file does not exist in the destination
    Missing,
    /// Remove: the output file was deleted
    Removed,
    WouldRemove,
}

impl Action {
    /// Returns the kebab-case name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Copied => "copied",
            Self::Skipped => "skipped",
            Self::SkippedBinary => "skipped-binary",
            Self::SkippedLarge => "skipped-large",
            Self::WouldRender => "would-render",
            Self::WouldCopy => "would-copy",
            Self::WouldSkipBinary => "would-skip-binary",
            Self::WouldSkipLarge => "would-skip-large",
            Self::Missing => "missing",
            Self::Removed => "removed",
            Self::WouldRemove => "would-remove",
        }
    }

    /// Whether this action changed a file in the destination.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Rendered | Self::Copied | Self::Removed)
    }

    /// The dry-run counterpart of a skip caused by a content heuristic.
    #[must_use]
    pub const fn dry_run_variant(self) -> Self {
        match self {
            Self::Rendered => Self::WouldRender,
            Self::Copied => Self::WouldCopy,
            Self::SkippedBinary => Self::WouldSkipBinary,
            Self::SkippedLarge => Self::WouldSkipLarge,
            Self::Removed => Self::WouldRemove,
            other => other,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a result stream: the destination path and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub path: PathBuf,
    pub action: Action,
}

impl ActionResult {
    pub fn new(path: impl Into<PathBuf>, action: Action) -> Self {
        Self {
            path: path.into(),
            action,
        }
    }
}
