//! Global constants used throughout the bldrx codebase.
//!
//! File layout conventions, heuristics thresholds and timeouts live here so
//! they are discoverable in one place.

use std::time::Duration;

/// Suffix marking a template file as renderable.
///
/// The output path of a renderable entry is its relative path with this suffix
/// stripped (`README.md.j2` → `README.md`).
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Directory under the destination root reserved for bldrx bookkeeping.
pub const TOOL_NAMESPACE: &str = ".bldrx";

/// Subdirectory of [`TOOL_NAMESPACE`] holding backup sets.
pub const BACKUPS_DIR: &str = "backups";

/// Raw files strictly larger than this many bytes are skipped unless forced.
pub const LARGE_FILE_THRESHOLD: u64 = 1_000_000;

/// Number of leading bytes scanned for a NUL byte by the binary heuristic.
pub const BINARY_SNIFF_LEN: usize = 1024;

/// Timestamp format used in backup set directory names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Optional per-template manifest listing files and their SHA-256 checksums.
pub const TEMPLATE_MANIFEST_FILE: &str = "bldrx-manifest.json";

/// Environment variable overriding the user templates root.
pub const TEMPLATES_DIR_ENV: &str = "BLDRX_TEMPLATES_DIR";

/// Environment variable overriding the packaged templates root.
pub const PACKAGED_TEMPLATES_DIR_ENV: &str = "BLDRX_PACKAGED_TEMPLATES_DIR";

/// Environment variable overriding the global config file location.
pub const CONFIG_PATH_ENV: &str = "BLDRX_CONFIG";

/// Timeout for git commands run by the commit hook (60 seconds).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
