//! Template context building.
//!
//! Templates see the caller's metadata as flat string variables plus `year`,
//! the current calendar year. `year` is always set by the engine and replaces
//! any caller-supplied value.

use chrono::Datelike;
use std::collections::BTreeMap;
use tera::Context as TeraContext;

/// Metadata supplied by the caller, keyed by variable name.
pub type Metadata = BTreeMap<String, String>;

/// Name of the variable the engine injects into every render.
pub const YEAR_VARIABLE: &str = "year";

/// Builds the render context for `metadata` using the current local year.
#[must_use]
pub fn build_context(metadata: &Metadata) -> TeraContext {
    build_context_for_year(metadata, chrono::Local::now().year())
}

/// Builds the render context with an explicit `year`.
#[must_use]
pub fn build_context_for_year(metadata: &Metadata, year: i32) -> TeraContext {
    let mut context = TeraContext::new();
    for (key, value) in metadata {
        context.insert(key.as_str(), value);
    }
    context.insert(YEAR_VARIABLE, &year);
    context
}

/// Names of the top-level variables available in a context built from `metadata`.
#[must_use]
pub fn available_variables(metadata: &Metadata) -> Vec<String> {
    let mut names: Vec<String> = metadata.keys().cloned().collect();
    if !metadata.contains_key(YEAR_VARIABLE) {
        names.push(YEAR_VARIABLE.to_string());
    }
    names
}

/// Parses `KEY=VALUE` pairs into metadata. Later pairs win.
///
/// # Errors
///
/// [`BldrxError::InvalidMetadata`](crate::core::BldrxError::InvalidMetadata) when a
/// pair has no `=` or an empty key.
pub fn parse_metadata_pairs<I, S>(pairs: I) -> anyhow::Result<Metadata>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut metadata = Metadata::new();
    for pair in pairs {
        let pair = pair.as_ref();
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(crate::core::BldrxError::InvalidMetadata {
                    input: pair.to_string(),
                }
                .into());
            }
        }
    }
    Ok(metadata)
}
