//! Integration test suite for bldrx
//!
//! End-to-end tests of the engine and the `bldrx` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **apply**: render/copy/skip decisions, idempotence, dry-run purity, merging,
//!   binary and large file heuristics, backups, git commits
//! - **atomic**: rollback after an injected write failure
//! - **preview**: diffs and single-file rendering
//! - **validate**: validation and manifest verification
//! - **cli**: the command-line surface

#[path = "../common/mod.rs"]
mod common;

mod apply;
mod atomic;
mod cli;
mod preview;
mod validate;
