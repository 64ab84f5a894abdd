//! Text templating for bldrx.
//!
//! Files whose name ends with `.j2` are rendered with [Tera](https://keats.github.io/tera/)
//! against the caller's metadata; every other file is copied verbatim. The
//! rendered output path drops the `.j2` suffix.
//!
//! # Template Context
//!
//! - every metadata key as a string variable (`{{ project_name }}`, `{{ email }}`)
//! - `year`: the current calendar year, always set by the engine
//!
//! # Supported Features
//!
//! - Variable substitution, conditionals, loops and the standard Tera filters
//! - `{% include %}` and `{% extends %}` resolved against the template root, by
//!   relative path including the `.j2` suffix
//!
//! Output is never HTML-escaped.
//!
//! # Example
//!
//! ```rust,no_run
//! use bldrx::templating::{Metadata, TemplateRenderer};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let renderer = TemplateRenderer::new(Path::new("templates/python-cli"))?;
//! let mut metadata = Metadata::new();
//! metadata.insert("project_name".into(), "demo".into());
//! let readme = renderer.render_file("README.md.j2", &metadata)?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod renderer;
pub mod variables;

pub use context::{
    Metadata, YEAR_VARIABLE, available_variables, build_context, build_context_for_year,
    parse_metadata_pairs,
};
pub use renderer::{TemplateRenderer, error_chain_text};

use crate::constants::TEMPLATE_SUFFIX;

/// Whether a template-relative path names a renderable file.
#[must_use]
pub fn is_renderable(rel: &str) -> bool {
    rel.ends_with(TEMPLATE_SUFFIX)
}

/// The output path of a template entry: renderables lose their suffix.
#[must_use]
pub fn output_rel_path(rel: &str) -> &str {
    rel.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(rel)
}
