use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ChatError, Result};
use crate::responder::{Responder, DEFAULT_SIMULATED_DELAY, DEFAULT_SIMULATED_REPLY};
use crate::service::{ChatServiceClient, DEFAULT_SERVICE_URL};

/// Environment variable that overrides `service_url`
pub const SERVICE_URL_ENV: &str = "SIMPLE_CHAT_URL";

pub const DEFAULT_GREETING: &str = "Hello, how can I help you?";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Local,
    #[default]
    Remote,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: ResponseMode,
    pub service_url: String,
    pub simulated_delay_ms: u64,
    pub simulated_reply: String,
    pub greeting: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ResponseMode::default(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY.as_millis() as u64,
            simulated_reply: DEFAULT_SIMULATED_REPLY.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.json"))
    }

    pub fn dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::Config("could not determine config directory".to_string()))?;

        Ok(config_dir.join("simple-chat"))
    }

    /// Apply the URL environment override, if set
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            self.apply_url_override(&url);
        }
    }

    fn apply_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.service_url = url.to_string();
        }
    }

    pub fn responder(&self) -> Result<Responder> {
        match self.mode {
            ResponseMode::Local => Ok(Responder::Simulated {
                delay: Duration::from_millis(self.simulated_delay_ms),
                reply: self.simulated_reply.clone(),
            }),
            ResponseMode::Remote => {
                if self.service_url.is_empty() {
                    return Err(ChatError::Config("service_url is empty".to_string()));
                }
                let timeout = Duration::from_secs(self.request_timeout_secs);
                Ok(Responder::Remote(ChatServiceClient::new(&self.service_url, timeout)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            mode: ResponseMode::Local,
            simulated_delay_ms: 10,
            greeting: None,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "mode": "local" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mode, ResponseMode::Local);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.simulated_delay_ms, 2000);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ChatError::Json(_))));
    }

    #[test]
    fn test_blank_url_override_is_ignored() {
        let mut config = Config::default();
        config.apply_url_override("   ");
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);

        config.apply_url_override("http://example.test/chat");
        assert_eq!(config.service_url, "http://example.test/chat");
    }

    #[test]
    fn test_responder_follows_mode() {
        let local = Config {
            mode: ResponseMode::Local,
            ..Config::default()
        };
        assert!(matches!(local.responder().unwrap(), Responder::Simulated { .. }));

        let remote = Config {
            service_url: String::new(),
            ..Config::default()
        };
        assert!(matches!(remote.responder(), Err(ChatError::Config(_))));
    }
}
