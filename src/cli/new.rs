//! Scaffold a new project.
//!
//! # Examples
//!
//! ```bash
//! bldrx new my-tool --type python-cli --author "Ada"
//! bldrx new my-site --templates react-app,ci --dry-run
//! ```

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::common::{ApplyArgs, apply_templates, project_name, template_names};
use crate::core::BldrxError;
use crate::engine::Engine;
use crate::utils::fs::ensure_dir;

/// Project types with a default template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectType {
    PythonCli,
    PythonLib,
    NodeApi,
    ReactApp,
}

impl ProjectType {
    /// Templates applied when `--templates` is not given.
    #[must_use]
    pub const fn default_templates(self) -> &'static [&'static str] {
        match self {
            Self::PythonCli | Self::PythonLib => &["python-cli"],
            Self::NodeApi => &["node-api"],
            Self::ReactApp => &["react-app"],
        }
    }
}

#[derive(Args, Debug)]
pub struct NewCommand {
    /// Directory of the project to create
    project: PathBuf,

    /// Comma-separated templates to apply (default: based on --type)
    #[arg(long, value_delimiter = ',')]
    templates: Vec<String>,

    /// Project type used to choose default templates
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    project_type: Option<ProjectType>,

    #[command(flatten)]
    apply: ApplyArgs,
}

impl NewCommand {
    pub async fn execute(self, engine: &Engine) -> Result<()> {
        if self.project.exists() && !self.apply.force {
            return Err(BldrxError::Other {
                message: format!(
                    "Destination {} already exists. Use --force to override.",
                    self.project.display()
                ),
            }
            .into());
        }

        let templates = self.templates();
        let metadata = self.apply.metadata(&project_name(&self.project))?;

        if !self.apply.dry_run {
            ensure_dir(&self.project)?;
        }

        apply_templates(engine, &self.apply, &templates, &self.project, &metadata).await
    }

    /// Explicit `--templates` win over the defaults of `--type` (python-cli when absent).
    fn templates(&self) -> Vec<String> {
        let explicit = template_names(&self.templates);
        if !explicit.is_empty() {
            return explicit;
        }
        self.project_type
            .unwrap_or(ProjectType::PythonCli)
            .default_templates()
            .iter()
            .map(|t| (*t).to_string())
            .collect()
    }
}
