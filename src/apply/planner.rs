//! Per-entry planning: which action each template entry gets.
//!
//! The planner walks a template root in deterministic order and classifies
//! each entry. The decision helpers here are pure; the apply and preview
//! streams combine them with filesystem state.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::{BINARY_SNIFF_LEN, LARGE_FILE_THRESHOLD, TEMPLATE_MANIFEST_FILE};
use crate::merge::MergeStrategy;
use crate::templating::{is_renderable, output_rel_path};
use crate::utils::fs::{read_head, to_slash_path};

/// One file or directory inside a template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Path relative to the template root, `/`-separated
    pub relative_path: String,
    pub is_renderable: bool,
    pub is_directory: bool,
}

impl TemplateEntry {
    /// The path the entry produces in the destination, relative to its root.
    #[must_use]
    pub fn output_rel_path(&self) -> PathBuf {
        if self.is_renderable {
            PathBuf::from(output_rel_path(&self.relative_path))
        } else {
            PathBuf::from(&self.relative_path)
        }
    }

    /// The entry's location inside the template root.
    #[must_use]
    pub fn source_path(&self, template_root: &Path) -> PathBuf {
        template_root.join(&self.relative_path)
    }
}

/// Lazily walks a template root, directories before their contents, siblings
/// in lexicographic order.
///
/// The template manifest at the root is metadata and never yielded.
pub struct TemplateWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl TemplateWalk {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter(),
        }
    }
}

impl Iterator for TemplateWalk {
    type Item = Result<TemplateEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    return Some(Err(anyhow::Error::new(err).context(format!(
                        "Failed to walk template directory: {}",
                        self.root.display()
                    ))));
                }
            };

            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => to_slash_path(rel),
                Err(_) => continue,
            };
            if entry.depth() == 1 && rel == TEMPLATE_MANIFEST_FILE {
                continue;
            }

            let is_directory = entry.file_type().is_dir();
            return Some(Ok(TemplateEntry {
                is_renderable: !is_directory && is_renderable(&rel),
                is_directory,
                relative_path: rel,
            }));
        }
    }
}

/// Content class of a raw (non-renderable) file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawClass {
    Text,
    /// A NUL byte appears in the first [`BINARY_SNIFF_LEN`] bytes
    Binary,
    /// Larger than [`LARGE_FILE_THRESHOLD`] bytes
    Large,
}

/// Whether an existing output is left alone.
///
/// An existing output is overwritten when `force` is set, or merged when a
/// merge strategy is selected. Raw files never merge and pass
/// [`MergeStrategy::None`].
#[must_use]
pub const fn skip_existing(exists: bool, force: bool, merge: MergeStrategy) -> bool {
    exists && !force && !merge.is_merge()
}

/// Classifies a raw file from its leading bytes and total size.
///
/// The binary check runs first, so a large binary file is reported binary.
#[must_use]
pub fn classify_raw(head: &[u8], size: u64) -> RawClass {
    let sniff = &head[..head.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        RawClass::Binary
    } else if size > LARGE_FILE_THRESHOLD {
        RawClass::Large
    } else {
        RawClass::Text
    }
}

/// Reads what [`classify_raw`] needs from a file on disk.
pub fn classify_raw_file(path: &Path) -> Result<RawClass> {
    let head = read_head(path, BINARY_SNIFF_LEN)?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?
        .len();
    Ok(classify_raw(&head, size))
}
