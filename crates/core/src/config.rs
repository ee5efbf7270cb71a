use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Endpoint receiving change notifications. Dispatch is a logged no-op
    /// until this is set.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// When true, dispatch is withheld until the linkedin record holds a
    /// non-empty publicIdentifier. When false, the payload carries an empty
    /// identifier instead.
    #[serde(default = "default_require_public_identifier")]
    pub require_public_identifier: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_require_public_identifier() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            require_public_identifier: default_require_public_identifier(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Host of the Chrome remote-debugging endpoint.
    #[serde(default = "default_debug_host")]
    pub debug_host: String,
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,
    /// Tab-list poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_debug_host() -> String {
    "127.0.0.1".to_string()
}

fn default_debug_port() -> u16 {
    9222
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_host: default_debug_host(),
            debug_port: default_debug_port(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Override for the state-file location (defaults to Paths::state_file).
    #[serde(default)]
    pub state_file: Option<String>,
}

impl Config {
    pub fn load(paths: &Paths) -> Result<Self> {
        Self::load_from(&paths.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, paths: &Paths) -> Result<()> {
        let path = paths.config_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
