//! Static checks of a resolved template.
//!
//! Validation never renders into a destination. For each file of the template
//! it records:
//!
//! - **syntax errors** in renderable files, with the template engine's
//!   diagnostic text
//! - **undefined variables** referenced by renderable files that parse, given
//!   the supplied metadata (the set may be empty)
//! - **missing files**: raw entries that are not readable regular files, such
//!   as broken symlinks
//!
//! Syntax errors and missing files always fail a template. Undefined variables
//! fail only in strict mode and are warnings otherwise.
//!
//! [`manifest`] adds an integrity check against an optional checksum manifest.

pub mod manifest;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use walkdir::WalkDir;

pub use manifest::{VerificationReport, verify};

use crate::core::BldrxError;
use crate::source::TemplateSource;
use crate::templating::{Metadata, TemplateRenderer, is_renderable};
use crate::utils::fs::to_slash_path;

/// Result of validating one template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub template: String,
    /// Renderable path → diagnostic text
    pub syntax_errors: BTreeMap<String, String>,
    /// Renderable path → variables referenced but not defined
    pub undefined_variables: BTreeMap<String, BTreeSet<String>>,
    /// Raw paths that are not readable regular files
    pub missing_files: Vec<String>,
    /// Non-fatal suggestions, such as a missing README or LICENSE
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Whether any renderable file references an undefined variable.
    #[must_use]
    pub fn has_undefined_variables(&self) -> bool {
        self.undefined_variables.values().any(|vars| !vars.is_empty())
    }

    /// Whether this report fails validation.
    #[must_use]
    pub fn has_errors(&self, strict: bool) -> bool {
        !self.syntax_errors.is_empty()
            || !self.missing_files.is_empty()
            || (strict && self.has_undefined_variables())
    }
}

/// Validates every file of `source` against `metadata`.
pub fn validate(source: &TemplateSource, metadata: &Metadata) -> Result<ValidationReport> {
    let renderer = TemplateRenderer::new(&source.root_path)?;
    let mut report = ValidationReport {
        template: source.name.clone(),
        ..ValidationReport::default()
    };
    let mut file_names = Vec::new();

    for entry in WalkDir::new(&source.root_path).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to walk template directory: {}", source.root_path.display())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&source.root_path).map(to_slash_path) else {
            continue;
        };
        file_names.push(entry.file_name().to_string_lossy().to_lowercase());

        if !is_renderable(&rel) {
            let readable = entry.path().is_file() && fs::File::open(entry.path()).is_ok();
            if !readable {
                report.missing_files.push(rel);
            }
            continue;
        }

        let body = match fs::read(entry.path()).map(String::from_utf8) {
            Ok(Ok(body)) => body,
            Ok(Err(_)) => {
                report.syntax_errors.insert(rel, "file is not valid UTF-8 text".to_string());
                continue;
            }
            Err(_) => {
                report.missing_files.push(rel);
                continue;
            }
        };

        match renderer.undefined_variables(&rel, &body, metadata) {
            Ok(vars) => {
                report.undefined_variables.insert(rel, vars);
            }
            Err(err) => {
                let message = match err.downcast::<BldrxError>() {
                    Ok(BldrxError::RenderSyntaxError {
                        message,
                        ..
                    }) => message,
                    Ok(other) => other.to_string(),
                    Err(other) => format!("{other:#}"),
                };
                report.syntax_errors.insert(rel, message);
            }
        }
    }

    if !file_names.iter().any(|f| f == "readme.md" || f == "readme.md.j2") {
        report.recommendations.push("No README.md or README.md.j2 found".to_string());
    }
    if !file_names.iter().any(|f| {
        f.starts_with("license") || f.starts_with("copying") || f.starts_with("unlicense")
    }) {
        report.recommendations.push("No LICENSE/COPYING/UNLICENSE file found".to_string());
    }

    tracing::debug!(
        "Validated '{}': {} syntax errors, {} missing files",
        report.template,
        report.syntax_errors.len(),
        report.missing_files.len()
    );
    Ok(report)
}
