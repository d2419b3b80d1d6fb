//! User configuration for the fetcher.
//!
//! Read from `$STENCIL_CONFIG`, or `<config dir>/stencil/stencil.toml`.
//! A missing file means defaults.

pub mod parser;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use parser::{parse_stencil_toml, parse_stencil_toml_str, to_toml};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STENCIL_CONFIG";

/// Config file name inside the per-user config directory.
pub const CONFIG_FILE: &str = "stencil.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilConfig {
    /// HTTP client settings
    pub http: HttpSettings,
    /// Clone collaborator settings
    pub clone: CloneSettings,
}

/// `[http]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// `User-Agent` sent with every request
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// `[clone]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneSettings {
    /// Depth-1 fetch for remote repositories
    pub shallow: bool,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self { shallow: true }
    }
}

fn default_user_agent() -> String {
    format!("stencil/{}", env!("CARGO_PKG_VERSION"))
}

impl StencilConfig {
    /// Reject values the fetcher cannot use.
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.http.user_agent.trim().is_empty() {
            anyhow::bail!("http.user_agent must not be empty");
        }
        Ok(())
    }

    /// Load from the default location, falling back to defaults when no
    /// file exists.
    pub fn load() -> anyhow::Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        parse_stencil_toml(path)
    }
}

/// `$STENCIL_CONFIG`, else the per-user config file.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("stencil").join(CONFIG_FILE))
}
