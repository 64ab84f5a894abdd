//! Flags and output helpers shared by the `new` and `add` commands.

use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};

use crate::apply::ApplyRequest;
use crate::core::{Action, ActionResult};
use crate::engine::Engine;
use crate::merge::MergeStrategy;
use crate::templating::{Metadata, parse_metadata_pairs};

/// Metadata and write-policy flags for applying templates.
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Author name (`author_name` in templates)
    #[arg(long)]
    pub author: Option<String>,

    /// Author email (`email` in templates)
    #[arg(long)]
    pub email: Option<String>,

    /// GitHub username (`github_username` in templates)
    #[arg(long)]
    pub github_username: Option<String>,

    /// Additional metadata as KEY=VALUE; may be repeated
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Overwrite existing files and copy binary or large files
    #[arg(long)]
    pub force: bool,

    /// Show planned actions without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Back up files before overwriting them
    #[arg(long)]
    pub backup: bool,

    /// Roll back every change if any write fails
    #[arg(long)]
    pub atomic: bool,

    /// How to combine rendered output with an existing file
    #[arg(long, value_enum, default_value_t = MergeStrategy::None)]
    pub merge: MergeStrategy,

    /// Commit the applied changes with git
    #[arg(long)]
    pub git_commit: bool,

    /// Commit message used with `--git-commit`
    #[arg(long, value_name = "MESSAGE")]
    pub git_message: Option<String>,

    /// Templates directory searched before user and packaged templates
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,
}

impl ApplyArgs {
    /// Builds the metadata for `project_name`.
    ///
    /// The four standard keys are always present (empty when not given) and
    /// `--meta` pairs override them.
    pub fn metadata(&self, project_name: &str) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        metadata.insert("project_name".to_string(), project_name.to_string());
        metadata.insert("author_name".to_string(), self.author.clone().unwrap_or_default());
        metadata.insert("email".to_string(), self.email.clone().unwrap_or_default());
        metadata.insert(
            "github_username".to_string(),
            self.github_username.clone().unwrap_or_default(),
        );
        metadata.extend(parse_metadata_pairs(&self.meta)?);
        Ok(metadata)
    }

    pub fn request(&self, template: &str, destination: &Path, metadata: Metadata) -> ApplyRequest {
        ApplyRequest::new(template, destination)
            .metadata(metadata)
            .force(self.force)
            .dry_run(self.dry_run)
            .backup(self.backup)
            .atomic(self.atomic)
            .merge_strategy(self.merge)
            .commit_to_vcs(self.git_commit)
            .commit_message(self.git_message.clone())
            .templates_dir(self.templates_dir.clone())
    }
}

/// Trims names and drops empty entries from a comma-separated list.
pub fn template_names(raw: &[String]) -> Vec<String> {
    raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// The project name used for `project_name`: the final path component.
pub fn project_name(destination: &Path) -> String {
    destination
        .file_name()
        .map_or_else(|| destination.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Applies each template in turn, printing results as they are produced.
pub async fn apply_templates(
    engine: &Engine,
    args: &ApplyArgs,
    templates: &[String],
    destination: &Path,
    metadata: &Metadata,
) -> Result<()> {
    for template in templates {
        println!("Applying template: {}", template.bold());

        let mut run = engine.apply(args.request(template, destination, metadata.clone()))?;
        for result in run.by_ref() {
            print_result(&result?);
        }

        let outcome = run.finish().await?;
        if outcome.committed {
            println!("  {} {} file(s)", "committed".green(), outcome.writes);
        }
    }

    println!("{}", "Done.".green());
    Ok(())
}

pub fn print_result(result: &ActionResult) {
    println!("  {}: {}", paint(result.action), result.path.display());
}

pub fn paint(action: Action) -> ColoredString {
    let label = action.as_str();
    match action {
        Action::Rendered | Action::Copied | Action::Removed => label.green(),
        Action::WouldRender | Action::WouldCopy | Action::WouldRemove => label.cyan(),
        Action::Missing => label.dimmed(),
        Action::Skipped
        | Action::SkippedBinary
        | Action::SkippedLarge
        | Action::WouldSkipBinary
        | Action::WouldSkipLarge => label.yellow(),
    }
}
