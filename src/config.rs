//! Configuration management for Medilens.
//!
//! Settings come from an optional TOML file, then environment variables
//! (after `.env` has been loaded by `main`). A missing API key is valid: the
//! analyzer then serves sample data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "medilens.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "MEDILENS_CONFIG";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    // Gemini's inline data limit.
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars (besides the `GEMINI_*` ones handled by [`LlmConfig`]):
    /// - `MEDILENS_HOST`: bind address
    /// - `MEDILENS_PORT`: listen port
    /// - `MEDILENS_MAX_UPLOAD_BYTES`: request body limit
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("MEDILENS_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("MEDILENS_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("MEDILENS_MAX_UPLOAD_BYTES") {
            if let Ok(n) = val.parse() {
                self.server.max_upload_bytes = n;
            }
        }
        self.llm = self.llm.with_overrides(&lookup);
        self
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Find the config file to use, if any.
///
/// An explicit path wins, then `MEDILENS_CONFIG`, then `medilens.toml` in
/// the working directory.
fn find_config_file(options: &LoadOptions) -> Option<PathBuf> {
    if let Some(ref path) = options.config_path {
        return Some(path.clone());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILENAME);
    local.exists().then_some(local)
}

/// Load settings from a TOML file.
pub fn load_file(path: &Path) -> anyhow::Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    Settings::from_toml(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Load settings: config file (if any), then environment overrides.
pub fn load_settings(options: &LoadOptions) -> anyhow::Result<Settings> {
    let settings = match find_config_file(options) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_file(&path)?
        }
        None => Settings::default(),
    };

    Ok(settings.with_env_overrides())
}
