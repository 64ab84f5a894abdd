//! Version control integration
//!
//! After a successful apply, bldrx can record the result as a commit in the
//! destination's git repository. The commit stages everything in the working
//! tree (`git add -A`) and commits with the requested message.
//!
//! bldrx shells out to the system `git` binary, so user configuration such as
//! identity and hooks applies unchanged.
//!
//! # Errors
//!
//! Every failure is reported as [`BldrxError::VcsIntegrationFailure`] with git's
//! own diagnostic output attached:
//! - the destination has no `.git` entry
//! - git is not installed
//! - `git add` or `git commit` exits unsuccessfully (nothing to commit, missing
//!   identity, a rejecting hook)

pub mod command_builder;

use anyhow::Result;
use std::path::Path;

pub use command_builder::{GitCommand, GitCommandOutput};

use crate::core::BldrxError;
use crate::utils::platform::get_git_command;

/// Checks whether `path` is the root of a git working tree.
#[must_use]
pub fn is_valid_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Checks whether the git executable can be found on `PATH`.
#[must_use]
pub fn is_git_installed() -> bool {
    which::which(get_git_command()).is_ok()
}

/// Ensures `path` is a git repository and git is available.
pub fn ensure_git_repo(path: &Path) -> Result<()> {
    if !is_valid_git_repo(path) {
        return Err(BldrxError::VcsIntegrationFailure {
            reason: format!("{} is not a git repository", path.display()),
            output: String::new(),
        }
        .into());
    }
    if !is_git_installed() {
        return Err(BldrxError::VcsIntegrationFailure {
            reason: "git executable not found on PATH".to_string(),
            output: String::new(),
        }
        .into());
    }
    Ok(())
}

/// Stages every change under `repo` and commits it with `message`.
pub async fn commit_all(repo: &Path, message: &str) -> Result<()> {
    ensure_git_repo(repo)?;

    GitCommand::add_all().current_dir(repo).execute_success().await?;
    GitCommand::commit(message).current_dir(repo).execute_success().await?;

    tracing::info!("Committed changes in {}: {}", repo.display(), message);
    Ok(())
}
