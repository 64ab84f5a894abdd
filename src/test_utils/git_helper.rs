//! Git test helper utilities
//!
//! A thin wrapper for preparing and inspecting repositories in tests. Use this
//! instead of raw `std::process::Command` for git operations in tests.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Initializes a repository with a test identity so commits succeed.
    pub fn init(&self) -> Result<()> {
        self.run_git_command(&["init", "--quiet"], "Failed to initialize git repository")?;
        self.run_git_command(
            &["config", "user.email", "test@bldrx.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(
            &["config", "user.name", "bldrx test"],
            "Failed to configure git user name",
        )?;
        self.run_git_command(&["config", "commit.gpgsign", "false"], "Failed to disable signing")?;
        Ok(())
    }

    /// Number of commits reachable from HEAD (0 for a fresh repository).
    pub fn commit_count(&self) -> Result<usize> {
        match self.run_git_command(&["rev-list", "--count", "HEAD"], "Failed to count commits") {
            Ok(out) => Ok(out.trim().parse()?),
            Err(_) => Ok(0),
        }
    }

    /// Subject line of the HEAD commit.
    pub fn last_commit_message(&self) -> Result<String> {
        let out = self.run_git_command(&["log", "-1", "--format=%s"], "Failed to read git log")?;
        Ok(out.trim().to_string())
    }

    pub fn status_porcelain(&self) -> Result<String> {
        self.run_git_command(&["status", "--porcelain"], "Failed to get git status")
    }
}
