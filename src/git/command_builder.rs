//! Fluent builder for running git commands
//!
//! Every git invocation goes through [`GitCommand`], which runs the command with
//! `-C <dir>`, captures output, enforces a timeout and turns failures into
//! [`BldrxError::VcsIntegrationFailure`] carrying git's diagnostic output.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_COMMAND_TIMEOUT;
use crate::core::BldrxError;
use crate::utils::platform::get_git_command;

/// Builder for a single git invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use bldrx::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = GitCommand::new()
///     .args(["status", "--porcelain"])
///     .current_dir("my-project")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitCommand {
    /// Command arguments passed after `-C <dir>`
    args: Vec<String>,

    /// Directory the command operates on
    current_dir: Option<PathBuf>,

    /// Environment variables set for the git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: Some(GIT_COMMAND_TIMEOUT),
        }
    }
}

/// Captured output of a successful git command.
#[derive(Debug, Clone)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory git operates on (passed as `-C <dir>`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for this invocation only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Execute the command and return its captured output.
    ///
    /// # Errors
    ///
    /// [`BldrxError::VcsIntegrationFailure`] when git cannot be spawned, times
    /// out or exits unsuccessfully.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let git_command = get_git_command();
        let full_args = self.full_args();
        let operation = self.operation();

        let mut cmd = Command::new(git_command);
        cmd.args(&full_args);
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(target: "git", "Executing command: {} {}", git_command, full_args.join(" "));

        let output_future = cmd.output();
        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(BldrxError::VcsIntegrationFailure {
                        reason: format!(
                            "git {operation} timed out after {} seconds",
                            duration.as_secs()
                        ),
                        output: String::new(),
                    }
                    .into());
                }
            },
            None => output_future.await,
        };

        let output = output
            .map_err(|err| BldrxError::VcsIntegrationFailure {
                reason: format!("failed to run {git_command}: {err}"),
                output: String::new(),
            })
            .with_context(|| format!("Failed to execute git {}", full_args.join(" ")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "Error: {}", stderr);
            }

            let diagnostic = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(BldrxError::VcsIntegrationFailure {
                reason: format!("git {operation} failed"),
                output: diagnostic.trim().to_string(),
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}", stdout.trim_end());
        }
        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command, discarding its output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await.map(|_| ())
    }

    /// `git add -A`
    pub fn add_all() -> Self {
        Self::new().args(["add", "-A"])
    }

    /// `git commit -m <message>`
    pub fn commit(message: &str) -> Self {
        Self::new().args(["commit", "-m"]).arg(message)
    }
}
