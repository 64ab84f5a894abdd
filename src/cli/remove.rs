//! Remove a template's outputs from a project.
//!
//! Removal is destructive and never prompts, so one of `--force`, `--yes` or
//! `--dry-run` is required. `--yes` implies `--force`, and `--dry-run` reports
//! what would be removed.
//!
//! ```bash
//! bldrx remove . ci --dry-run
//! bldrx remove . ci --yes
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::print_result;
use crate::core::BldrxError;
use crate::engine::Engine;

#[derive(Args, Debug)]
pub struct RemoveCommand {
    /// Project directory
    project: PathBuf,

    /// Template whose outputs should be removed
    template: String,

    /// Confirm removal (implies --force)
    #[arg(long)]
    yes: bool,

    /// Actually delete files
    #[arg(long)]
    force: bool,

    /// Show planned removals without deleting files
    #[arg(long)]
    dry_run: bool,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,
}

impl RemoveCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        if !self.project.is_dir() {
            return Err(BldrxError::Other {
                message: format!("Destination {} does not exist", self.project.display()),
            }
            .into());
        }
        if !self.removal_authorized() {
            return Err(BldrxError::Other {
                message: format!(
                    "Refusing to remove template '{}' from {} without --force, --yes or --dry-run",
                    self.template,
                    self.project.display()
                ),
            }
            .into());
        }

        let run = engine.remove(
            &self.template,
            &self.project,
            self.removal_authorized(),
            self.dry_run,
            self.templates_dir.as_deref(),
        )?;
        for result in run {
            print_result(&result?);
        }

        println!("Done.");
        Ok(())
    }

    /// `--yes` and `--dry-run` both stand in for `--force`.
    const fn removal_authorized(&self) -> bool {
        self.yes || self.force || self.dry_run
    }
}
