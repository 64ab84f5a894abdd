//! Command-line interface for bldrx.
//!
//! Each command lives in its own module with an argument struct and an
//! `execute` method taking the shared [`Engine`]. The CLI never prompts: every
//! destructive operation requires an explicit flag.
//!
//! # Available Commands
//!
//! ## Scaffolding
//! - `new` - create a project from one or more templates
//! - `add` - inject templates into an existing project
//! - `remove` - delete a template's outputs from a project
//!
//! ## Templates
//! - `list` - list available templates
//! - `install` / `uninstall` - manage user templates
//! - `preview` - show template files, rendered output or diffs
//! - `validate` - check templates for syntax errors and undefined variables
//! - `verify` - check a template against its checksum manifest
//!
//! # Examples
//!
//! ```bash
//! bldrx new my-tool --type python-cli --author "Ada" --email ada@example.com
//! bldrx add . --templates ci,docs --merge marker --atomic --backup
//! bldrx preview ci --render --diff --dest .
//! bldrx validate --strict --meta project_name=demo
//! ```
//!
//! # Output
//!
//! Results are printed to stdout. Logs go to stderr and are controlled by
//! `RUST_LOG`, `--verbose` and `--quiet`.

mod add;
mod common;
mod install;
mod list;
mod new;
mod preview;
mod remove;
mod uninstall;
mod validate;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;
use crate::engine::Engine;

pub use common::ApplyArgs;
pub use new::ProjectType;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Disable colored output
    pub no_color: bool,
    /// Explicit global config file, overriding `BLDRX_CONFIG`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Installs the global tracing subscriber writing to stderr.
    ///
    /// `RUST_LOG` wins over [`log_level`](Self::log_level) when set. Calling
    /// this twice is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_str()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Applies [`no_color`](Self::no_color) to the `colored` crate.
    pub fn apply_color(&self) {
        if self.no_color {
            colored::control::set_override(false);
        }
    }
}

/// bldrx - project scaffold & template injector
#[derive(Parser, Debug)]
#[command(
    name = "bldrx",
    about = "Project scaffold & template injector",
    version,
    long_about = "bldrx scaffolds new projects and injects templates into existing ones, \
                  with dry runs, merging, backups and rollback-safe atomic application."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file (default: `~/.bldrx/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold a new project from templates
    New(new::NewCommand),

    /// Inject templates into an existing project
    #[command(alias = "add-templates")]
    Add(add::AddCommand),

    /// Remove a template's files from a project
    #[command(alias = "remove-template")]
    Remove(remove::RemoveCommand),

    /// List available templates
    #[command(alias = "list-templates")]
    List(list::ListCommand),

    /// Install a directory as a user template
    #[command(alias = "install-template")]
    Install(install::InstallCommand),

    /// Remove a user template
    #[command(alias = "uninstall-template")]
    Uninstall(uninstall::UninstallCommand),

    /// Preview template files, rendered output or diffs against a project
    #[command(alias = "preview-template")]
    Preview(preview::PreviewCommand),

    /// Validate templates for syntax errors and undefined variables
    Validate(validate::ValidateCommand),

    /// Verify a template against its checksum manifest
    Verify(verify::VerifyCommand),
}

impl Cli {
    /// Runs the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translates the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_color: self.no_color,
            config_path: self.config.clone(),
        }
    }

    /// Runs the command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        config.apply_color();

        let global = GlobalConfig::load_with_optional(config.config_path.clone()).await?;
        let engine = Engine::from_config(global)?;

        match self.command {
            Commands::New(cmd) => cmd.execute(&engine).await,
            Commands::Add(cmd) => cmd.execute(&engine).await,
            Commands::Remove(cmd) => cmd.execute(&engine),
            Commands::List(cmd) => cmd.execute(&engine),
            Commands::Install(cmd) => cmd.execute(&engine),
            Commands::Uninstall(cmd) => cmd.execute(&engine),
            Commands::Preview(cmd) => cmd.execute(&engine),
            Commands::Validate(cmd) => cmd.execute(&engine),
            Commands::Verify(cmd) => cmd.execute(&engine),
        }
    }
}
