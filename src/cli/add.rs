//! Inject templates into an existing project.
//!
//! # Examples
//!
//! ```bash
//! bldrx add . --templates ci,docs
//! bldrx add ../service --templates readme --merge marker --backup --atomic
//! bldrx add . --templates license --git-commit --git-message "chore: add license"
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{ApplyArgs, apply_templates, project_name, template_names};
use crate::core::BldrxError;
use crate::engine::Engine;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// Existing project directory
    project: PathBuf,

    /// Comma-separated templates to add
    #[arg(long, value_delimiter = ',', required = true)]
    templates: Vec<String>,

    #[command(flatten)]
    apply: ApplyArgs,
}

impl AddCommand {
    pub async fn execute(self, engine: &Engine) -> Result<()> {
        if !self.project.is_dir() {
            return Err(BldrxError::Other {
                message: format!("Destination {} does not exist", self.project.display()),
            }
            .into());
        }

        let templates = template_names(&self.templates);
        if templates.is_empty() {
            return Err(BldrxError::Other {
                message: "No templates given; run 'bldrx list' to see available templates"
                    .to_string(),
            }
            .into());
        }

        let name = self
            .project
            .canonicalize()
            .map_or_else(|_| project_name(&self.project), |p| project_name(&p));
        let metadata = self.apply.metadata(&name)?;

        apply_templates(engine, &self.apply, &templates, &self.project, &metadata).await
    }
}
