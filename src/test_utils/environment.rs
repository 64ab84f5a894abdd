//! Isolated workspace with user, packaged and project directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fixtures::TemplateFixture;
use crate::config::GlobalConfig;
use crate::engine::Engine;
use crate::source::TemplateRoots;

/// A temporary directory laid out as:
///
/// ```text
/// <tmp>/user/       user templates root
/// <tmp>/packaged/   packaged templates root
/// <tmp>/project/    destination project
/// ```
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub user_root: PathBuf,
    pub packaged_root: PathBuf,
    pub project_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let user_root = temp_dir.path().join("user");
        let packaged_root = temp_dir.path().join("packaged");
        let project_dir = temp_dir.path().join("project");

        fs::create_dir_all(&user_root)?;
        fs::create_dir_all(&packaged_root)?;
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            temp_dir,
            user_root,
            packaged_root,
            project_dir,
        })
    }

    pub fn add_packaged(&self, fixture: &TemplateFixture) -> Result<PathBuf> {
        fixture.write_to(&self.packaged_root)
    }

    pub fn add_user(&self, fixture: &TemplateFixture) -> Result<PathBuf> {
        fixture.write_to(&self.user_root)
    }

    #[must_use]
    pub fn roots(&self) -> TemplateRoots {
        TemplateRoots::new(&self.user_root, &self.packaged_root)
    }

    /// An engine over this environment's roots with default configuration.
    #[must_use]
    pub fn engine(&self) -> Engine {
        Engine::new(self.roots(), GlobalConfig::default())
    }

    #[must_use]
    pub fn project_path(&self, rel: &str) -> PathBuf {
        self.project_dir.join(rel)
    }

    pub fn write_project_file(&self, rel: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.project_path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read_project_file(&self, rel: &str) -> Result<String> {
        let path = self.project_path(rel);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    #[must_use]
    pub fn project_file_exists(&self, rel: &str) -> bool {
        self.project_path(rel).exists()
    }

    /// Every file under the project, as sorted `/`-separated relative paths.
    pub fn project_files(&self) -> Result<Vec<String>> {
        list_files(&self.project_dir)
    }
}

fn list_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let rel = entry.path().strip_prefix(root)?;
            files.push(crate::utils::fs::to_slash_path(rel));
        }
    }
    Ok(files)
}
