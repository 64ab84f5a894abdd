//! Common test utilities for bldrx integration tests
//!
//! Library-level tests use [`bldrx::test_utils::TestEnvironment`]. CLI tests
//! use [`CliProject`], which runs the real binary against isolated template
//! roots and a config path that does not exist.

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub use bldrx::test_utils::{TemplateFixture, TestEnvironment, TestGit};

/// A [`TestEnvironment`] plus a way to run the `bldrx` binary inside it.
pub struct CliProject {
    pub env: TestEnvironment,
}

impl CliProject {
    pub fn new() -> Self {
        Self {
            env: TestEnvironment::new().expect("failed to create test environment"),
        }
    }

    pub fn with_packaged(self, fixture: &TemplateFixture) -> Self {
        self.env.add_packaged(fixture).expect("failed to write packaged template");
        self
    }

    pub fn with_user(self, fixture: &TemplateFixture) -> Self {
        self.env.add_user(fixture).expect("failed to write user template");
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.env.project_dir
    }

    pub fn root(&self) -> PathBuf {
        self.env.temp_dir.path().to_path_buf()
    }

    /// A `bldrx` command with isolated roots, running in the temp directory.
    pub fn bldrx(&self) -> Command {
        let mut cmd = Command::cargo_bin("bldrx").expect("bldrx binary not built");
        cmd.current_dir(self.env.temp_dir.path())
            .env("BLDRX_TEMPLATES_DIR", &self.env.user_root)
            .env("BLDRX_PACKAGED_TEMPLATES_DIR", &self.env.packaged_root)
            .env("BLDRX_CONFIG", self.env.temp_dir.path().join("no-config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }

    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}

/// Snapshot of every file under `root` with its bytes, for purity checks.
pub fn snapshot_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.expect("walk failed");
        if entry.file_type().is_file() {
            let rel = entry.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
            files.push((rel, fs::read(entry.path()).unwrap()));
        }
    }
    files
}

/// Every file and directory under `root`, as sorted relative paths.
pub fn snapshot_entries(root: &Path) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.expect("walk failed");
            entry.path().strip_prefix(root).unwrap().to_string_lossy().into_owned()
        })
        .collect()
}
