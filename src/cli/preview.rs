//! Preview template files, rendered output, or diffs against a project.
//!
//! | Flags | Output |
//! |-------|--------|
//! | (none) | the template's file list |
//! | `--file F` | the raw content of `F` |
//! | `--file F --render` | `F` rendered with `--meta` |
//! | `--diff` | what applying the template to `--dest` would change |
//!
//! ```bash
//! bldrx preview python-cli
//! bldrx preview python-cli --file README.md.j2 --render --meta project_name=demo
//! bldrx preview python-cli --render --diff --dest ./demo --json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::common::paint;
use crate::apply::PreviewEntry;
use crate::core::BldrxError;
use crate::engine::Engine;
use crate::templating::parse_metadata_pairs;
use crate::utils::path_validation::destination_path;

#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// Template to preview
    template: String,

    /// Template-relative file to show (e.g. README.md.j2)
    #[arg(long, value_name = "PATH")]
    file: Option<String>,

    /// Render with the given metadata
    #[arg(long)]
    render: bool,

    /// Show unified diffs of what would change in --dest
    #[arg(long)]
    diff: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Project directory compared against by --diff
    #[arg(long, value_name = "DIR", default_value = ".")]
    dest: PathBuf,

    /// Metadata as KEY=VALUE; may be repeated
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    meta: Vec<String>,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,
}

impl PreviewCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        let metadata = parse_metadata_pairs(&self.meta)?;
        let templates_dir = self.templates_dir.as_deref();

        if self.diff {
            let entries = engine
                .preview(&self.template, &self.dest, metadata, true, templates_dir)?
                .collect::<Result<Vec<PreviewEntry>>>()?;

            if self.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!("{}: {}", paint(entry.action), entry.path.display());
                    if let Some(diff) = &entry.diff {
                        print_block(diff);
                    }
                }
            }
            return Ok(());
        }

        let Some(file) = &self.file else {
            let files = engine.template_files(&self.template, templates_dir)?;
            if self.json {
                println!("{}", serde_json::to_string(&files)?);
            } else {
                println!("Files in template {}:", self.template.bold());
                for file in files {
                    println!("  - {file}");
                }
            }
            return Ok(());
        };

        let content = if self.render {
            engine.render_template_file(&self.template, file, &metadata, templates_dir)?
        } else {
            self.raw_content(engine, file)?
        };

        if self.json {
            let output = json!({
                "template": self.template,
                "file": file,
                "rendered": self.render,
                "content": content,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_block(&content);
        }
        Ok(())
    }

    fn raw_content(&self, engine: &Engine, file: &str) -> Result<String> {
        let source = engine.resolve(&self.template, self.templates_dir.as_deref())?;
        let path = destination_path(&source.root_path, Path::new(file))?;
        if !path.is_file() {
            return Err(BldrxError::Other {
                message: format!("File not found: {file}"),
            }
            .into());
        }
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Prints `text` followed by exactly one newline.
fn print_block(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
