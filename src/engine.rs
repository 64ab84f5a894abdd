//! High-level entry point tying resolution, apply, preview, validation and the
//! registry together.
//!
//! [`Engine`] owns the template roots and global configuration. Each method
//! takes an optional templates directory that is searched before the user and
//! packaged roots for that call only.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::apply::{ApplyRequest, ApplyRun, PreviewRun, RemoveRun};
use crate::config::GlobalConfig;
use crate::core::BldrxError;
use crate::registry;
use crate::source::{TemplateInfo, TemplateRoots, TemplateSource};
use crate::templating::{Metadata, TemplateRenderer, is_renderable};
use crate::utils::path_validation::destination_path;
use crate::validate::{self, ValidationReport, VerificationReport};

/// The template engine.
#[derive(Debug, Clone)]
pub struct Engine {
    roots: TemplateRoots,
    config: GlobalConfig,
}

impl Engine {
    pub fn new(roots: TemplateRoots, config: GlobalConfig) -> Self {
        Self {
            roots,
            config,
        }
    }

    /// Builds an engine whose roots come from `config` and the environment.
    pub fn from_config(config: GlobalConfig) -> Result<Self> {
        let roots = config.template_roots(None)?;
        Ok(Self::new(roots, config))
    }

    #[must_use]
    pub const fn roots(&self) -> &TemplateRoots {
        &self.roots
    }

    #[must_use]
    pub fn user_templates_root(&self) -> &Path {
        &self.roots.user_root
    }

    fn roots_for(&self, templates_dir: Option<&Path>) -> TemplateRoots {
        match templates_dir {
            Some(dir) => self.roots.clone().with_override(Some(dir.to_path_buf())),
            None => self.roots.clone(),
        }
    }

    /// Resolves a template by name.
    pub fn resolve(&self, name: &str, templates_dir: Option<&Path>) -> Result<TemplateSource> {
        self.roots_for(templates_dir).resolve(name)
    }

    /// Starts applying a template. Fills in the configured default commit
    /// message when the request has none.
    pub fn apply(&self, mut request: ApplyRequest) -> Result<ApplyRun> {
        if request.commit_message.is_none() {
            request.commit_message = self.config.default_commit_message.clone();
        }
        ApplyRun::start(request, &self.roots)
    }

    /// Starts removing a template's outputs from `destination`.
    pub fn remove(
        &self,
        name: &str,
        destination: &Path,
        force: bool,
        dry_run: bool,
        templates_dir: Option<&Path>,
    ) -> Result<RemoveRun> {
        let source = self.resolve(name, templates_dir)?;
        Ok(RemoveRun::new(&source, destination, force, dry_run))
    }

    /// Starts previewing what applying `name` to `destination` would change.
    pub fn preview(
        &self,
        name: &str,
        destination: &Path,
        metadata: Metadata,
        with_diff: bool,
        templates_dir: Option<&Path>,
    ) -> Result<PreviewRun> {
        let source = self.resolve(name, templates_dir)?;
        PreviewRun::new(source, destination, metadata, with_diff)
    }

    /// Returns one template file: rendered when it is renderable, verbatim otherwise.
    pub fn render_template_file(
        &self,
        name: &str,
        file: &str,
        metadata: &Metadata,
        templates_dir: Option<&Path>,
    ) -> Result<String> {
        let source = self.resolve(name, templates_dir)?;
        let path = destination_path(&source.root_path, Path::new(file))?;
        if !path.is_file() {
            return Err(BldrxError::Other {
                message: format!("Template file '{file}' not found in template '{name}'"),
            }
            .into());
        }

        if is_renderable(file) {
            TemplateRenderer::new(&source.root_path)?.render_file(file, metadata)
        } else {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
        }
    }

    /// Sorted relative paths of a template's files.
    pub fn template_files(&self, name: &str, templates_dir: Option<&Path>) -> Result<Vec<String>> {
        self.resolve(name, templates_dir)?.files()
    }

    /// Every available template, user templates shadowing packaged ones.
    pub fn list_templates(&self, templates_dir: Option<&Path>) -> Result<Vec<TemplateInfo>> {
        self.roots_for(templates_dir).list_templates()
    }

    pub fn validate(
        &self,
        name: &str,
        metadata: &Metadata,
        templates_dir: Option<&Path>,
    ) -> Result<ValidationReport> {
        let source = self.resolve(name, templates_dir)?;
        validate::validate(&source, metadata)
    }

    pub fn verify(&self, name: &str, templates_dir: Option<&Path>) -> Result<VerificationReport> {
        let source = self.resolve(name, templates_dir)?;
        validate::verify(&source)
    }

    pub fn install_user_template(
        &self,
        src: &Path,
        name: Option<&str>,
        force: bool,
        wrap: bool,
    ) -> Result<PathBuf> {
        registry::install_user_template(&self.roots.user_root, src, name, force, wrap)
    }

    pub fn uninstall_user_template(&self, name: &str) -> Result<()> {
        registry::uninstall_user_template(&self.roots.user_root, name)
    }
}
