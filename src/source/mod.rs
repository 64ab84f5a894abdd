//! Template source resolution.
//!
//! A template is a directory whose name is the template name. Three roots are
//! searched in fixed order and the first root holding a directory with the
//! requested name wins:
//!
//! 1. **Override** - the per-request `--templates-dir`
//! 2. **User** - templates installed with `bldrx install`
//! 3. **Packaged** - templates shipped with the installation
//!
//! Resolution is read-only and happens before any planning, so a
//! [`BldrxError::TemplateNotFound`] always aborts a run before the first write.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::BldrxError;
use crate::utils::fs::to_slash_path;

/// Which root a template was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateOrigin {
    Override,
    User,
    Packaged,
}

impl fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Override => "override",
            Self::User => "user",
            Self::Packaged => "packaged",
        };
        f.write_str(label)
    }
}

/// A resolved template directory. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub root_path: PathBuf,
    pub origin: TemplateOrigin,
}

impl TemplateSource {
    /// Returns the template's files as sorted `/`-separated relative paths.
    pub fn files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root_path).sort_by_file_name() {
            let entry = entry.with_context(|| {
                format!("Failed to walk template directory: {}", self.root_path.display())
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root_path).with_context(|| {
                format!("Template entry outside its root: {}", entry.path().display())
            })?;
            files.push(to_slash_path(rel));
        }
        files.sort();
        Ok(files)
    }
}

/// Summary row produced by [`TemplateRoots::list_templates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub origin: TemplateOrigin,
    pub path: PathBuf,
}

/// The three template roots in lookup order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoots {
    pub override_root: Option<PathBuf>,
    pub user_root: PathBuf,
    pub packaged_root: PathBuf,
}

impl TemplateRoots {
    /// Roots with no override and the given user and packaged directories.
    pub fn new(user_root: impl Into<PathBuf>, packaged_root: impl Into<PathBuf>) -> Self {
        Self {
            override_root: None,
            user_root: user_root.into(),
            packaged_root: packaged_root.into(),
        }
    }

    /// Sets the per-request override root.
    #[must_use]
    pub fn with_override(mut self, root: Option<PathBuf>) -> Self {
        self.override_root = root;
        self
    }

    fn ordered(&self) -> impl Iterator<Item = (&Path, TemplateOrigin)> {
        self.override_root
            .as_deref()
            .map(|root| (root, TemplateOrigin::Override))
            .into_iter()
            .chain([
                (self.user_root.as_path(), TemplateOrigin::User),
                (self.packaged_root.as_path(), TemplateOrigin::Packaged),
            ])
    }

    /// Resolves a template name to its directory.
    ///
    /// # Errors
    ///
    /// [`BldrxError::TemplateNotFound`] when no root holds a directory named `name`.
    pub fn resolve(&self, name: &str) -> Result<TemplateSource> {
        if name.is_empty() || Path::new(name).components().count() != 1 {
            return Err(BldrxError::TemplateNotFound {
                name: name.to_string(),
            }
            .into());
        }

        for (root, origin) in self.ordered() {
            let candidate = root.join(name);
            if candidate.is_dir() {
                tracing::debug!(
                    "Resolved template '{}' from {} root: {}",
                    name,
                    origin,
                    candidate.display()
                );
                return Ok(TemplateSource {
                    name: name.to_string(),
                    root_path: candidate,
                    origin,
                });
            }
        }

        Err(BldrxError::TemplateNotFound {
            name: name.to_string(),
        }
        .into())
    }

    /// Lists every available template, sorted by name.
    ///
    /// A name present in several roots is reported once, from the root that
    /// [`resolve`](Self::resolve) would pick.
    pub fn list_templates(&self) -> Result<Vec<TemplateInfo>> {
        let mut seen: BTreeMap<String, TemplateInfo> = BTreeMap::new();

        for (root, origin) in self.ordered() {
            if !root.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(root)
                .with_context(|| format!("Failed to read templates root: {}", root.display()))?;
            for entry in entries {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                seen.entry(name.clone()).or_insert_with(|| TemplateInfo {
                    name,
                    origin,
                    path: entry.path(),
                });
            }
        }

        Ok(seen.into_values().collect())
    }

    /// Resolves `name` and returns its sorted relative file paths.
    pub fn template_files(&self, name: &str) -> Result<Vec<String>> {
        self.resolve(name)?.files()
    }
}
