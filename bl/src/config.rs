//! Configuration for buildlog

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::Verbosity;
use crate::recorder::RecorderSettings;

/// Main buildlog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verbosity used when the command line does not give one
    pub verbosity: Verbosity,

    /// Sender name of the build host itself
    #[serde(rename = "host-sender")]
    pub host_sender: String,

    /// Webhook delivery
    pub webhook: WebhookConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            host_sender: crate::HOST_SENDER_NAME.to_string(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./buildlog.yml
        let local_config = PathBuf::from("buildlog.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/buildlog/buildlog.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("buildlog").join("buildlog.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Recorder settings derived from this configuration
    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            host_sender: self.host_sender.clone(),
            webhook_base: self.webhook.base_url.clone(),
            webhook_enabled: self.webhook.enabled,
            webhook_timeout: Duration::from_millis(self.webhook.timeout_ms),
        }
    }
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Post the transcript on shutdown (off unless asked for)
    pub enabled: bool,

    /// Base a bare webhook token is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: crate::DEFAULT_WEBHOOK_BASE.to_string(),
            timeout_ms: crate::DEFAULT_WEBHOOK_TIMEOUT_MS,
        }
    }
}
