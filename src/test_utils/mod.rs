//! Test utilities for bldrx
//!
//! Helpers for building template trees and isolated workspaces in unit and
//! integration tests. Available under `cfg(test)` and the `test-utils`
//! feature, which the crate enables for its own dev builds.
//!
//! # Example
//!
//! ```rust,no_run
//! use bldrx::apply::ApplyRequest;
//! use bldrx::test_utils::{TemplateFixture, TestEnvironment};
//!
//! let env = TestEnvironment::new().unwrap();
//! env.add_packaged(
//!     &TemplateFixture::new("docs").file("README.md.j2", "# {{ project_name }}\n"),
//! )
//! .unwrap();
//!
//! let request = ApplyRequest::new("docs", &env.project_dir).meta("project_name", "demo");
//! for result in env.engine().apply(request).unwrap() {
//!     result.unwrap();
//! }
//! assert_eq!(env.read_project_file("README.md").unwrap(), "# demo\n");
//! ```

pub mod environment;
pub mod fixtures;
pub mod git_helper;

pub use environment::TestEnvironment;
pub use fixtures::TemplateFixture;
pub use git_helper::TestGit;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=bldrx=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // Show module targets like "git"
            .with_thread_ids(false)
            .try_init();
    });
}
