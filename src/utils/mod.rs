//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - synchronous file system helpers (directory creation, copying, checksums)
//! - [`path_validation`] - keeps computed destination paths under the destination root
//! - [`platform`] - platform-specific helpers and path expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use bldrx::utils::{destination_path, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let root = Path::new("my-project");
//! let target = destination_path(root, Path::new("src/main.py"))?;
//! ensure_dir(target.parent().unwrap())?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod path_validation;
pub mod platform;

pub use fs::{
    calculate_checksum, copy_dir, ensure_dir, ensure_parent_dir, read_head, remove_dir_all,
    to_slash_path,
};
pub use path_validation::{destination_path, validate_no_traversal};
pub use platform::{get_git_command, get_home_dir, is_windows, resolve_path};
