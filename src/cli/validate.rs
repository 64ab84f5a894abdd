//! Validate templates.
//!
//! Each template is checked for syntax errors, unreadable files and undefined
//! variables, and verified against its checksum manifest when it has one.
//! Undefined variables are warnings unless `--strict` is given. The process
//! exits with status 2 when any template fails.
//!
//! ```bash
//! bldrx validate                       # every available template
//! bldrx validate python-cli --strict --meta project_name=demo
//! bldrx validate --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::engine::Engine;
use crate::templating::parse_metadata_pairs;
use crate::validate::{ValidationReport, VerificationReport};

/// Exit status used when validation fails.
pub const VALIDATION_FAILURE_EXIT_CODE: i32 = 2;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Templates to validate (default: all available templates)
    templates: Vec<String>,

    /// Treat undefined variables as errors
    #[arg(long)]
    strict: bool,

    /// Metadata as KEY=VALUE used to resolve variables; may be repeated
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    meta: Vec<String>,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TemplateResult {
    ok: bool,
    #[serde(flatten)]
    validation: ValidationReport,
    manifest: VerificationReport,
}

#[derive(Debug, Serialize)]
struct ValidationSummary {
    ok: bool,
    strict: bool,
    templates: Vec<TemplateResult>,
}

impl ValidateCommand {
    pub fn execute(self, engine: &Engine) -> Result<()> {
        let summary = self.run(engine)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        if !summary.ok {
            std::process::exit(VALIDATION_FAILURE_EXIT_CODE);
        }
        Ok(())
    }

    fn run(&self, engine: &Engine) -> Result<ValidationSummary> {
        let metadata = parse_metadata_pairs(&self.meta)?;
        let templates_dir = self.templates_dir.as_deref();

        let names = if self.templates.is_empty() {
            engine.list_templates(templates_dir)?.into_iter().map(|t| t.name).collect()
        } else {
            self.templates.clone()
        };

        let mut templates = Vec::with_capacity(names.len());
        for name in &names {
            let validation = engine.validate(name, &metadata, templates_dir)?;
            let manifest = engine.verify(name, templates_dir)?;
            templates.push(TemplateResult {
                ok: !validation.has_errors(self.strict) && manifest.ok(),
                validation,
                manifest,
            });
        }

        Ok(ValidationSummary {
            ok: templates.iter().all(|t| t.ok),
            strict: self.strict,
            templates,
        })
    }
}

fn print_summary(summary: &ValidationSummary) {
    if summary.templates.is_empty() {
        println!("No templates to validate.");
        return;
    }

    for result in &summary.templates {
        let report = &result.validation;
        if result.ok {
            println!("{} {}", "✓".green(), report.template.bold());
        } else {
            println!("{} {}", "✗".red(), report.template.bold());
        }

        for (path, message) in &report.syntax_errors {
            println!("    {} syntax error in {path}: {message}", "✗".red());
        }
        for path in &report.missing_files {
            println!("    {} missing or unreadable: {path}", "✗".red());
        }
        for (path, vars) in &report.undefined_variables {
            if vars.is_empty() {
                continue;
            }
            let names = vars.iter().cloned().collect::<Vec<_>>().join(", ");
            let mark = if summary.strict { "✗".red() } else { "⚠".yellow() };
            println!("    {mark} undefined variables in {path}: {names}");
        }

        let manifest = &result.manifest;
        for path in &manifest.missing {
            println!("    {} listed in manifest but missing: {path}", "✗".red());
        }
        for mismatch in &manifest.mismatched {
            println!("    {} checksum mismatch: {}", "✗".red(), mismatch.path);
        }
        for path in &manifest.unlisted {
            println!("    {} not listed in manifest: {path}", "✗".red());
        }

        for recommendation in &report.recommendations {
            println!("    {} {recommendation}", "⚠".yellow());
        }
    }

    let failed = summary.templates.iter().filter(|t| !t.ok).count();
    if failed == 0 {
        println!("{}", format!("{} template(s) valid", summary.templates.len()).green());
    } else {
        println!(
            "{}",
            format!("{failed} of {} template(s) failed validation", summary.templates.len()).red()
        );
    }
}
