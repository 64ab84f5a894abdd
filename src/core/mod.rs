//! Core types for bldrx
//!
//! This module provides the types shared by every part of the engine:
//!
//! ## Error Management
//! - [`BldrxError`] - strongly-typed errors covering every classified failure
//! - [`ErrorContext`] - user-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] for CLI display
//!
//! ## Result Streams
//! - [`Action`] - the closed set of per-entry outcomes (`rendered`, `would-copy`, ...)
//! - [`ActionResult`] - a `(path, action)` pair as yielded by apply/remove
//!
//! # Examples
//!
//! ```rust,no_run
//! use bldrx::core::{Action, ActionResult};
//!
//! let result = ActionResult::new("/tmp/project/README.md", Action::Rendered);
//! println!("  {}: {}", result.action, result.path.display());
//! ```

pub mod action;
pub mod error;

pub use action::{Action, ActionResult};
pub use error::{BldrxError, ErrorContext, user_friendly_error};
