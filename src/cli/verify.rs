//! Verify a template against its `bldrx-manifest.json`, or write one.
//!
//! ```bash
//! bldrx verify python-cli
//! bldrx verify python-cli --generate   # record current checksums
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::validate::VALIDATION_FAILURE_EXIT_CODE;
use crate::constants::TEMPLATE_MANIFEST_FILE;
use crate::engine::Engine;
use crate::validate::manifest::TemplateManifest;

#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Template to verify
    template: String,

    /// Write a manifest with the template's current checksums instead of verifying
    #[arg(long)]
    generate: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,
}

impl VerifyCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        if self.generate {
            return self.generate_manifest(engine);
        }

        let report = engine.verify(&self.template, self.templates_dir.as_deref())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if !report.has_manifest {
            println!("{} {} has no manifest", "⚠".yellow(), self.template.bold());
        } else if report.ok() {
            println!("{} {} matches its manifest", "✓".green(), self.template.bold());
        } else {
            println!("{} {} does not match its manifest", "✗".red(), self.template.bold());
            for path in &report.missing {
                println!("    missing: {path}");
            }
            for mismatch in &report.mismatched {
                println!(
                    "    mismatch: {} (expected {}, found {})",
                    mismatch.path, mismatch.expected, mismatch.actual
                );
            }
            for path in &report.unlisted {
                println!("    unlisted: {path}");
            }
        }

        if !report.ok() {
            std::process::exit(VALIDATION_FAILURE_EXIT_CODE);
        }
        Ok(())
    }

    fn generate_manifest(&self, engine: &Engine) -> Result<()> {
        let source = engine.resolve(&self.template, self.templates_dir.as_deref())?;
        let manifest = TemplateManifest::generate(&source)?;
        let path = source.root_path.join(TEMPLATE_MANIFEST_FILE);

        let content = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&path, format!("{content}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("Wrote manifest with {} file(s)", manifest.files.len());
        println!("{} {}", "Wrote".green(), path.display());
        Ok(())
    }
}
