//! Remove a user template. Packaged templates are never touched.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::core::BldrxError;
use crate::engine::Engine;

#[derive(Args, Debug)]
pub struct UninstallCommand {
    /// Name of the user template
    name: String,

    /// Confirm removal
    #[arg(long)]
    yes: bool,
}

impl UninstallCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        if !self.yes {
            return Err(BldrxError::Other {
                message: format!("Refusing to remove user template '{}' without --yes", self.name),
            }
            .into());
        }

        engine.uninstall_user_template(&self.name)?;
        println!("{} {}", "Removed user template:".green(), self.name);
        Ok(())
    }
}
