//! Global configuration management for bldrx.
//!
//! This module handles the user configuration file (`~/.bldrx/config.toml`), which
//! stores where templates live and default values for the commit hook.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.bldrx/config.toml`
//! - **Windows**: `%APPDATA%\bldrx\config.toml`
//!
//! The location can be overridden with the `BLDRX_CONFIG` environment variable or
//! the global `--config` flag.
//!
//! # File Format
//!
//! ```toml
//! # Where `bldrx install` puts templates and where lookups check second
//! user_templates_dir = "~/work/templates"
//!
//! # Templates shipped alongside the binary
//! packaged_templates_dir = "/usr/local/share/bldrx/templates"
//!
//! # Message used by --git-commit when --git-message is not given
//! default_commit_message = "chore: apply bldrx template"
//! ```
//!
//! # Template Root Precedence
//!
//! For the user root: `BLDRX_TEMPLATES_DIR` → `user_templates_dir` → platform default.
//! For the packaged root: `BLDRX_PACKAGED_TEMPLATES_DIR` → `packaged_templates_dir` →
//! `templates/` next to the executable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{CONFIG_PATH_ENV, PACKAGED_TEMPLATES_DIR_ENV, TEMPLATES_DIR_ENV};
use crate::source::TemplateRoots;
use crate::utils::platform::{get_home_dir, is_windows, resolve_path};

/// User-wide bldrx settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Root holding user-installed templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_templates_dir: Option<String>,

    /// Root holding templates bundled with the installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaged_templates_dir: Option<String>,

    /// Commit message used when `--git-commit` is given without `--git-message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_commit_message: Option<String>,
}

impl GlobalConfig {
    /// Loads the configuration from `path`, or from the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads the configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Writes the configuration to a specific file, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// Returns the config file location: `BLDRX_CONFIG` or the platform default.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return resolve_path(&path);
        }
        Ok(Self::base_dir()?.join("config.toml"))
    }

    /// The per-user bldrx directory (`~/.bldrx`, or `%APPDATA%\bldrx` on Windows).
    pub fn base_dir() -> Result<PathBuf> {
        if is_windows() {
            Ok(dirs::config_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine application data directory"))?
                .join("bldrx"))
        } else {
            Ok(get_home_dir()?.join(".bldrx"))
        }
    }

    /// Computes the template roots from the process environment and this config.
    pub fn template_roots(&self, override_root: Option<PathBuf>) -> Result<TemplateRoots> {
        self.template_roots_with_env(override_root, |key| std::env::var(key).ok())
    }

    /// Computes the template roots using `env` for environment lookups.
    pub fn template_roots_with_env(
        &self,
        override_root: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<TemplateRoots> {
        let user_root = match env(TEMPLATES_DIR_ENV).or_else(|| self.user_templates_dir.clone()) {
            Some(dir) => resolve_path(&dir)?,
            None => Self::base_dir()?.join("templates"),
        };

        let packaged_root =
            match env(PACKAGED_TEMPLATES_DIR_ENV).or_else(|| self.packaged_templates_dir.clone()) {
                Some(dir) => resolve_path(&dir)?,
                None => default_packaged_root()?,
            };

        Ok(TemplateRoots {
            override_root,
            user_root,
            packaged_root,
        })
    }
}

fn default_packaged_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Unable to locate the running executable")?;
    let dir = exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(dir.join("templates"))
}
