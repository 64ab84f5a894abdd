//! Install a directory as a user template.
//!
//! By default the contents of the source directory become the template. With
//! `--wrap` the source folder itself is kept, which is useful for installing a
//! `.github` directory that should land as `.github/` at apply time.
//!
//! ```bash
//! bldrx install ./my-template
//! bldrx install ./.github --name github --wrap
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::engine::Engine;

#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Directory to install
    src: PathBuf,

    /// Name to install the template as (default: the directory name)
    #[arg(long)]
    name: Option<String>,

    /// Preserve the source's top-level folder inside the template
    #[arg(long)]
    wrap: bool,

    /// Overwrite an existing user template
    #[arg(long)]
    force: bool,
}

impl InstallCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        let installed =
            engine.install_user_template(&self.src, self.name.as_deref(), self.force, self.wrap)?;
        println!("{} {}", "Installed template to:".green(), installed.display());
        Ok(())
    }
}
