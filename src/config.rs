//! Configuration Management
//!
//! Handles persistent client configuration for awscall.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Base endpoint for the default HTTP transport
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// User agent sent by the default HTTP transport
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("awscall").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective endpoint (env > config)
    pub fn effective_endpoint(&self) -> Option<String> {
        if let Ok(endpoint) = std::env::var("AWSCALL_ENDPOINT") {
            if !endpoint.is_empty() {
                return Some(endpoint);
            }
        }
        self.endpoint.clone()
    }

    /// Get effective request timeout (env > config > default)
    pub fn effective_timeout(&self) -> Duration {
        let secs = std::env::var("AWSCALL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(self.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Get effective user agent
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| concat!("awscall/", env!("CARGO_PKG_VERSION")).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClientConfig::default();
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert!(config.effective_user_agent().starts_with("awscall/"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ClientConfig {
            endpoint: Some("https://widgets.example.com".to_string()),
            timeout_secs: Some(5),
            user_agent: None,
        };
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: ClientConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.endpoint.as_deref(), Some("https://widgets.example.com"));
        assert_eq!(decoded.effective_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let decoded: ClientConfig = serde_json::from_str("{}").unwrap();
        assert!(decoded.endpoint.is_none());
        assert!(decoded.timeout_secs.is_none());
    }
}
