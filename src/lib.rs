//! bldrx - project scaffold & template injector
//!
//! bldrx copies directory trees of template files into a destination project,
//! rendering files whose names end in `.j2` with user metadata and copying
//! everything else verbatim. It can scaffold a new project or inject templates
//! into an existing one.
//!
//! # Architecture Overview
//!
//! Applying a template is a lazy stream of per-file results. For every entry of
//! the template tree the planner decides what to do (render, copy, skip), the
//! merge resolver combines rendered content with existing files when asked to,
//! and the transaction manager performs the write. In atomic mode the first
//! failure restores every file touched earlier in the run.
//!
//! ## Key Features
//!
//! - **Layered templates**: an explicit templates directory, then user templates
//!   (`~/.bldrx/templates`), then packaged templates
//! - **Safe by default**: existing files are skipped unless `--force` or a merge
//!   strategy is given; binary and oversized raw files are skipped unless forced
//! - **Merging**: append, prepend, or replace a marker-delimited region
//! - **Transactions**: timestamped backups and rollback-safe atomic application
//! - **Preview**: unified diffs of what would change, without writing
//! - **Validation**: syntax errors, undefined variables and manifest integrity
//!
//! # Core Modules
//!
//! ## Engine
//! - [`engine`] - high-level entry point used by the CLI
//! - [`apply`] - apply, preview and remove result streams
//! - [`source`] - template resolution across the layered roots
//! - [`templating`] - rendering with Tera and the metadata context
//! - [`merge`] - merge strategies for existing outputs
//!
//! ## Safety
//! - [`transaction`] - direct and atomic write modes with rollback
//! - [`backup`] - timestamped backup sets under `.bldrx/backups`
//! - [`validate`] - template validation and checksum verification
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration (`~/.bldrx/config.toml`)
//! - [`core`] - error types and result stream actions
//! - [`git`] - optional commit of applied changes
//! - [`registry`] - installing and uninstalling user templates
//! - [`utils`] - filesystem, path and platform helpers
//!
//! # Template Layout
//!
//! ```text
//! python-cli/
//! ├── README.md.j2          → README.md (rendered)
//! ├── pyproject.toml.j2     → pyproject.toml (rendered)
//! ├── .gitignore            → .gitignore (copied)
//! └── src/
//!     └── main.py.j2        → src/main.py (rendered)
//! ```
//!
//! Every renderable file sees the metadata as top-level variables plus `year`
//! (the current year) unless the metadata already defines it.
//!
//! # Example
//!
//! ```rust,no_run
//! use bldrx::apply::ApplyRequest;
//! use bldrx::config::GlobalConfig;
//! use bldrx::engine::Engine;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = Engine::from_config(GlobalConfig::default())?;
//! let request = ApplyRequest::new("python-cli", "my-project")
//!     .meta("project_name", "my-project")
//!     .meta("author_name", "Ada")
//!     .dry_run(true);
//!
//! for result in engine.apply(request)? {
//!     let result = result?;
//!     println!("{}: {}", result.action, result.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod backup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;
pub mod git;
pub mod merge;
pub mod registry;
pub mod source;
pub mod templating;
pub mod transaction;
pub mod utils;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
