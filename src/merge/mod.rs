//! Merge strategies for rendered output that targets an existing file.
//!
//! A merge only ever happens for renderable entries whose output already
//! exists and was not skipped. The strategy decides how the freshly rendered
//! text is combined with what is on disk:
//!
//! | Strategy  | Result |
//! |-----------|--------|
//! | `none`    | the rendered text replaces the file |
//! | `append`  | existing text, a newline, then the rendered text |
//! | `prepend` | rendered text, a newline, then the existing text |
//! | `marker`  | the rendered text replaces the region between `<!-- start:NAME -->` and `<!-- end:NAME -->` |
//!
//! `NAME` is the output file's name (`README.md`, not a path). When either
//! marker is missing, `marker` falls back to `append`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::BldrxError;

/// How rendered output is reconciled with an existing file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Replace the file with the rendered output
    #[default]
    None,
    /// Add the rendered output after the existing content
    Append,
    /// Add the rendered output before the existing content
    Prepend,
    /// Replace the content between start and end markers
    Marker,
}

impl MergeStrategy {
    /// Whether this strategy combines output with existing content.
    #[must_use]
    pub const fn is_merge(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Combines `rendered` with `existing` for the file named `file_name`.
    #[must_use]
    pub fn merge(self, existing: &str, rendered: &str, file_name: &str) -> String {
        match self {
            Self::None => rendered.to_string(),
            Self::Append => append(existing, rendered),
            Self::Prepend => prepend(existing, rendered),
            Self::Marker => merge_markers(existing, rendered, file_name),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Marker => "marker",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = BldrxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            "marker" => Ok(Self::Marker),
            other => Err(BldrxError::ConfigError {
                message: format!(
                    "Unknown merge strategy '{other}' (expected none, append, prepend or marker)"
                ),
            }),
        }
    }
}

fn append(existing: &str, rendered: &str) -> String {
    format!("{}\n{}", existing.trim_end_matches('\n'), rendered)
}

fn prepend(existing: &str, rendered: &str) -> String {
    format!("{}\n{}", rendered.trim_end_matches('\n'), existing)
}

/// Start and end marker text for `file_name`, as written into files.
#[must_use]
pub fn marker_pair(file_name: &str) -> (String, String) {
    (format!("<!-- start:{file_name} -->"), format!("<!-- end:{file_name} -->"))
}

fn marker_regex(kind: &str, file_name: &str) -> Option<Regex> {
    Regex::new(&format!(r"<!--\s*{kind}:{}\s*-->", regex::escape(file_name))).ok()
}

/// Replaces the region between the first start marker and the first end
/// marker after it. Falls back to [`append`] when either is missing.
fn merge_markers(existing: &str, rendered: &str, file_name: &str) -> String {
    let (Some(start_re), Some(end_re)) =
        (marker_regex("start", file_name), marker_regex("end", file_name))
    else {
        return append(existing, rendered);
    };

    let Some(start) = start_re.find(existing) else {
        tracing::debug!("No start marker for {} found, appending", file_name);
        return append(existing, rendered);
    };
    let Some(end) = end_re.find_at(existing, start.end()) else {
        tracing::debug!("No end marker for {} found, appending", file_name);
        return append(existing, rendered);
    };

    let mut merged = String::with_capacity(existing.len() + rendered.len());
    merged.push_str(&existing[..start.end()]);
    merged.push_str(rendered);
    merged.push_str(&existing[end.start()..]);
    merged
}
