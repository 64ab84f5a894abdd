//! Integrity verification against a template's checksum manifest.
//!
//! A template may ship a `bldrx-manifest.json` at its root:
//!
//! ```json
//! {
//!   "files": {
//!     "README.md.j2": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
//!     "src/main.py.j2": "…"
//!   }
//! }
//! ```
//!
//! Keys are `/`-separated template-relative paths and values are lowercase
//! SHA-256 hex digests. A template without a manifest verifies trivially.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::TEMPLATE_MANIFEST_FILE;
use crate::source::TemplateSource;
use crate::utils::fs::calculate_checksum;
use crate::utils::path_validation::destination_path;

/// On-disk manifest format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateManifest {
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl TemplateManifest {
    /// Builds a manifest for every file currently in `source`.
    pub fn generate(source: &TemplateSource) -> Result<Self> {
        let mut files = BTreeMap::new();
        for rel in source.files()? {
            if rel == TEMPLATE_MANIFEST_FILE {
                continue;
            }
            let checksum = calculate_checksum(&source.root_path.join(&rel))?;
            files.insert(rel, checksum);
        }
        Ok(Self {
            files,
        })
    }
}

/// A file whose digest differs from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumMismatch {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub template: String,
    /// Whether the template has a manifest at all
    pub has_manifest: bool,
    /// Listed in the manifest but absent from the template
    pub missing: Vec<String>,
    pub mismatched: Vec<ChecksumMismatch>,
    /// Present in the template but not listed in the manifest
    pub unlisted: Vec<String>,
}

impl VerificationReport {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty() && self.unlisted.is_empty()
    }
}

/// Verifies `source` against its manifest, if it has one.
pub fn verify(source: &TemplateSource) -> Result<VerificationReport> {
    let mut report = VerificationReport {
        template: source.name.clone(),
        ..VerificationReport::default()
    };

    let manifest_path = source.root_path.join(TEMPLATE_MANIFEST_FILE);
    if !manifest_path.is_file() {
        tracing::debug!("Template '{}' has no manifest", source.name);
        return Ok(report);
    }
    report.has_manifest = true;

    let content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: TemplateManifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

    for (rel, expected) in &manifest.files {
        let path = destination_path(&source.root_path, std::path::Path::new(rel))?;
        if !path.is_file() {
            report.missing.push(rel.clone());
            continue;
        }
        let actual = calculate_checksum(&path)?;
        if !actual.eq_ignore_ascii_case(expected) {
            report.mismatched.push(ChecksumMismatch {
                path: rel.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    report.unlisted = source
        .files()?
        .into_iter()
        .filter(|rel| rel != TEMPLATE_MANIFEST_FILE && !manifest.files.contains_key(rel))
        .collect();

    Ok(report)
}
