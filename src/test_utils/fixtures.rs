//! Template tree fixtures.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A template directory described in memory and written on demand.
#[derive(Debug, Clone, Default)]
pub struct TemplateFixture {
    pub name: String,
    files: Vec<(String, Vec<u8>)>,
    dirs: Vec<String>,
}

impl TemplateFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a text file at the `/`-separated relative path `rel`.
    #[must_use]
    pub fn file(self, rel: impl Into<String>, content: impl AsRef<str>) -> Self {
        self.bytes(rel, content.as_ref().as_bytes())
    }

    /// Adds a file with arbitrary bytes.
    #[must_use]
    pub fn bytes(mut self, rel: impl Into<String>, content: &[u8]) -> Self {
        self.files.push((rel.into(), content.to_vec()));
        self
    }

    /// Adds an empty directory.
    #[must_use]
    pub fn dir(mut self, rel: impl Into<String>) -> Self {
        self.dirs.push(rel.into());
        self
    }

    /// A small renderable template: a README, a raw config file and a nested
    /// source file.
    pub fn basic(name: impl Into<String>) -> Self {
        Self::new(name)
            .file("README.md.j2", "# {{ project_name }}\n\nBy {{ author_name }}, {{ year }}\n")
            .file(".editorconfig", "root = true\n")
            .file("src/main.py.j2", "print(\"{{ project_name }}\")\n")
    }

    /// Writes the template under `root/<name>` and returns that directory.
    pub fn write_to(&self, root: &Path) -> Result<PathBuf> {
        let template_dir = root.join(&self.name);
        fs::create_dir_all(&template_dir)
            .with_context(|| format!("Failed to create {}", template_dir.display()))?;

        for dir in &self.dirs {
            fs::create_dir_all(template_dir.join(dir))?;
        }
        for (rel, content) in &self.files {
            let path = template_dir.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        }
        Ok(template_dir)
    }
}
