//! Read-only preview of what applying a template would change.

use anyhow::{Context, Result};
use serde::Serialize;
use similar::TextDiff;
use std::fs;
use std::path::{Path, PathBuf};

use super::planner::{TemplateEntry, TemplateWalk};
use crate::core::Action;
use crate::source::TemplateSource;
use crate::templating::{Metadata, TemplateRenderer};
use crate::utils::path_validation::destination_path;

/// Label used in diffs for an output that does not exist yet.
pub const EMPTY_LABEL: &str = "(empty)";

/// One previewed template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub path: PathBuf,
    /// `skipped` for byte-identical output, otherwise `would-render` or `would-copy`
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Lazy stream of preview entries. Never writes.
pub struct PreviewRun {
    source: TemplateSource,
    destination_root: PathBuf,
    metadata: Metadata,
    renderer: TemplateRenderer,
    walk: TemplateWalk,
    with_diff: bool,
    done: bool,
}

impl PreviewRun {
    pub fn new(
        source: TemplateSource,
        destination_root: &Path,
        metadata: Metadata,
        with_diff: bool,
    ) -> Result<Self> {
        let renderer = TemplateRenderer::new(&source.root_path)?;
        let walk = TemplateWalk::new(&source.root_path);
        Ok(Self {
            source,
            destination_root: destination_root.to_path_buf(),
            metadata,
            renderer,
            walk,
            with_diff,
            done: false,
        })
    }

    fn preview(&self, entry: &TemplateEntry) -> Result<PreviewEntry> {
        let out_rel = entry.output_rel_path();
        let out_path = destination_path(&self.destination_root, &out_rel)?;
        let src_path = entry.source_path(&self.source.root_path);

        let bytes = fs::read(&src_path)
            .with_context(|| format!("Failed to read template: {}", src_path.display()))?;

        let (new_content, pending) = if entry.is_renderable {
            match String::from_utf8(bytes) {
                Ok(body) => {
                    let rendered =
                        self.renderer.render(&entry.relative_path, &body, &self.metadata)?;
                    (rendered.into_bytes(), Action::WouldRender)
                }
                Err(_) => {
                    return Ok(PreviewEntry {
                        path: out_path,
                        action: Action::WouldSkipBinary,
                        diff: None,
                    });
                }
            }
        } else {
            (bytes, Action::WouldCopy)
        };

        let existing = if out_path.is_file() {
            Some(
                fs::read(&out_path)
                    .with_context(|| format!("Failed to read {}", out_path.display()))?,
            )
        } else {
            None
        };

        if existing.as_deref() == Some(new_content.as_slice()) {
            return Ok(PreviewEntry {
                path: out_path,
                action: Action::Skipped,
                diff: None,
            });
        }

        let diff = if self.with_diff {
            text_diff(existing.as_deref(), &new_content, &out_path)
        } else {
            None
        };

        Ok(PreviewEntry {
            path: out_path,
            action: pending,
            diff,
        })
    }
}

/// Unified diff between the existing bytes (if any) and the new bytes.
///
/// Returns `None` when either side is not UTF-8 text.
fn text_diff(existing: Option<&[u8]>, new: &[u8], out_path: &Path) -> Option<String> {
    let new_text = std::str::from_utf8(new).ok()?;
    let (old_text, old_label) = match existing {
        Some(bytes) => (std::str::from_utf8(bytes).ok()?, out_path.display().to_string()),
        None => ("", EMPTY_LABEL.to_string()),
    };
    let new_label = out_path.display().to_string();

    let diff = TextDiff::from_lines(old_text, new_text);
    Some(diff.unified_diff().context_radius(3).header(&old_label, &new_label).to_string())
}

impl Iterator for PreviewRun {
    type Item = Result<PreviewEntry>;

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
            let result = self.preview(&entry);
            if result.is_err() {
                self.done = true;
            }
            return Some(result);
        }
    }
}

impl std::iter::FusedIterator for PreviewRun {}
