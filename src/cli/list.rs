//! List available templates.
//!
//! User templates shadow packaged templates of the same name, and a
//! `--templates-dir` shadows both.
//!
//! ```bash
//! bldrx list
//! bldrx list --details
//! bldrx list --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::engine::Engine;
use crate::source::{TemplateInfo, TemplateOrigin};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output JSON (an array of names, or objects with --details)
    #[arg(long)]
    json: bool,

    /// Show origin, location and files of each template
    #[arg(long)]
    details: bool,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct DetailedEntry {
    #[serde(flatten)]
    info: TemplateInfo,
    files: Vec<String>,
}

impl ListCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        let templates = engine.list_templates(self.templates_dir.as_deref())?;

        if self.json {
            let output = if self.details {
                let detailed = templates
                    .into_iter()
                    .map(|info| {
                        let files = engine
                            .template_files(&info.name, self.templates_dir.as_deref())
                            .unwrap_or_default();
                        DetailedEntry {
                            info,
                            files,
                        }
                    })
                    .collect::<Vec<_>>();
                serde_json::to_string_pretty(&detailed)?
            } else {
                let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
                serde_json::to_string(&names)?
            };
            println!("{output}");
            return Ok(());
        }

        if templates.is_empty() {
            println!("No templates found.");
            return Ok(());
        }

        println!("Available templates:");
        for (i, info) in templates.iter().enumerate() {
            let marker = match info.origin {
                TemplateOrigin::Packaged => String::new(),
                origin => format!(" ({origin})"),
            };
            println!("  {}. {}{}", i + 1, info.name.bold(), marker.dimmed());

            if self.details {
                println!("      {}", info.path.display().to_string().dimmed());
                match engine.template_files(&info.name, self.templates_dir.as_deref()) {
                    Ok(files) => {
                        for file in files {
                            println!("      - {file}");
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Could not list files of '{}': {e:#}", info.name);
                        println!("      (could not list files)");
                    }
                }
            }
        }
        Ok(())
    }
}
