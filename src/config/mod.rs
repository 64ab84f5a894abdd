//! Configuration management for bldrx
//!
//! bldrx has a single configuration layer: the global user configuration
//! ([`GlobalConfig`], `~/.bldrx/config.toml`) which locates template roots and
//! supplies defaults. Per-run options are carried by
//! [`ApplyRequest`](crate::apply::ApplyRequest) instead.
//!
//! Environment variables take precedence over the file:
//!
//! | Variable | Purpose |
//! |----------|---------|
//! | `BLDRX_CONFIG` | Location of the config file |
//! | `BLDRX_TEMPLATES_DIR` | User templates root |
//! | `BLDRX_PACKAGED_TEMPLATES_DIR` | Packaged templates root |

pub mod global;

pub use global::GlobalConfig;
