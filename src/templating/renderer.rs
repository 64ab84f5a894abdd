//! Tera-backed rendering of template files.
//!
//! A [`TemplateRenderer`] is created once per template source. It preloads every
//! renderable file under the template root so `{% include %}` and `{% extends %}`
//! resolve by template-relative path, then compiles a fresh [`Tera`] instance for
//! each render.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strsim::levenshtein;
use tera::Tera;
use walkdir::WalkDir;

use super::context::{Metadata, available_variables, build_context};
use super::variables::referenced_variables;
use crate::constants::TEMPLATE_SUFFIX;
use crate::core::BldrxError;
use crate::utils::fs::to_slash_path;

/// Similarity threshold as a percentage of the variable name length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Renders the renderable files of one template.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    root: PathBuf,
    /// `(relative name, body)` of every UTF-8 renderable file under `root`.
    siblings: Vec<(String, String)>,
}

impl TemplateRenderer {
    /// Loads the renderable files under `root`.
    ///
    /// Files that are not valid UTF-8 are left out; the planner reports them as
    /// binary.
    pub fn new(root: &Path) -> Result<Self> {
        let mut siblings = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk template directory: {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(root) {
                Ok(rel) => to_slash_path(rel),
                Err(_) => continue,
            };
            if !rel.ends_with(TEMPLATE_SUFFIX) {
                continue;
            }
            let bytes = std::fs::read(entry.path())
                .with_context(|| format!("Failed to read template: {}", entry.path().display()))?;
            if let Ok(body) = String::from_utf8(bytes) {
                siblings.push((rel, body));
            }
        }

        tracing::debug!("Loaded {} renderable files from {}", siblings.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            siblings,
        })
    }

    /// The template root this renderer was loaded from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Renders `rel` (whose content is `body`) with `metadata` plus `year`.
    ///
    /// # Errors
    ///
    /// [`BldrxError::RenderSyntaxError`] when the body does not parse or rendering
    /// fails for a reason other than a missing variable, and
    /// [`BldrxError::RenderUndefinedVariable`] when a referenced variable is not
    /// defined.
    pub fn render(&self, rel: &str, body: &str, metadata: &Metadata) -> Result<String> {
        let tera = self.compile(rel, body)?;
        let context = build_context(metadata);
        tera.render(rel, &context)
            .map_err(|err| map_render_error(rel, &err, &available_variables(metadata)).into())
    }

    /// Reads `rel` from the template root and renders it.
    pub fn render_file(&self, rel: &str, metadata: &Metadata) -> Result<String> {
        let path = self.root.join(rel);
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        self.render(rel, &body, metadata)
    }

    /// Checks that `body` parses, without rendering it.
    pub fn parse(&self, rel: &str, body: &str) -> Result<()> {
        self.compile(rel, body).map(|_| ())
    }

    /// Collects the variables `body` references that `metadata` does not define.
    ///
    /// The parsed template is inspected statically, so references inside
    /// conditions and branches that would not render are reported too. `year`
    /// and names the template binds itself are never reported.
    ///
    /// # Errors
    ///
    /// [`BldrxError::RenderSyntaxError`] when the body does not parse.
    pub fn undefined_variables(
        &self,
        rel: &str,
        body: &str,
        metadata: &Metadata,
    ) -> Result<BTreeSet<String>> {
        let tera = self.compile(rel, body)?;
        let template = tera
            .templates
            .get(rel)
            .with_context(|| format!("Template '{rel}' missing after compilation"))?;
        let bound: BTreeSet<String> = available_variables(metadata).into_iter().collect();
        Ok(referenced_variables(&template.ast, &bound))
    }

    /// Compiles `body` as `rel` together with the other renderable files.
    ///
    /// Falls back to compiling `body` alone when a sibling fails to parse, so a
    /// broken sibling only affects templates that include it.
    fn compile(&self, rel: &str, body: &str) -> Result<Tera> {
        let mut templates: Vec<(&str, &str)> = self
            .siblings
            .iter()
            .filter(|(name, _)| name != rel)
            .map(|(name, content)| (name.as_str(), content.as_str()))
            .collect();
        templates.push((rel, body));

        let mut tera = new_tera();
        if tera.add_raw_templates(templates).is_ok() {
            return Ok(tera);
        }

        let mut tera = new_tera();
        tera.add_raw_template(rel, body).map_err(|err| BldrxError::RenderSyntaxError {
            path: rel.to_string(),
            message: error_chain_text(&err),
        })?;
        Ok(tera)
    }
}

fn new_tera() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera
}

/// Maps a Tera render error onto the engine's error taxonomy.
fn map_render_error(rel: &str, err: &tera::Error, available: &[String]) -> BldrxError {
    match undefined_variable_name(err) {
        Some(variable) => BldrxError::RenderUndefinedVariable {
            path: rel.to_string(),
            suggestions: find_similar_variables(&variable, available),
            variable,
        },
        None => BldrxError::RenderSyntaxError {
            path: rel.to_string(),
            message: error_chain_text(err),
        },
    }
}

/// Extracts the variable name from a "Variable `x` not found" error anywhere in the chain.
fn undefined_variable_name(err: &tera::Error) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    let mut current: Option<&dyn std::error::Error> = Some(err);
    while let Some(e) = current {
        if let Some(caps) = re.captures(&e.to_string()) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
        current = e.source();
    }
    None
}

/// Joins every message of the error chain, outermost first.
pub fn error_chain_text(err: &tera::Error) -> String {
    let mut messages = vec![err.to_string()];
    let mut current = std::error::Error::source(err);
    while let Some(e) = current {
        messages.push(e.to_string());
        current = e.source();
    }
    messages.join(": ")
}

/// Finds similar variable names using Levenshtein distance, closest first.
fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();
    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| var)
        .collect()
}
