//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are deserialized directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("backend.timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,
}

/// Backend endpoint configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// REST base URL
    pub base_url: String,
    /// WebSocket base URL; derived from `base_url` when unset
    pub ws_url: Option<String>,
    /// Timeout in seconds for REST calls
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            ws_url: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// The WebSocket base URL, deriving `ws://` / `wss://` from the REST
    /// scheme when no explicit value is configured.
    pub fn ws_url(&self) -> String {
        match &self.ws_url {
            Some(url) => url.clone(),
            None => self.base_url.replacen("http", "ws", 1),
        }
    }
}

/// Logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for JSONL transcript logs; unset disables them
    pub transcript_dir: Option<PathBuf>,
}

/// Complete raw configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: BackendConfig,
    pub log: LogConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.backend.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let config = FileConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000/");
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(config.log.transcript_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ws_url_is_derived_from_the_rest_scheme() {
        let mut backend = BackendConfig::default();
        assert_eq!(backend.ws_url(), "ws://localhost:8000/");

        backend.base_url = "https://detect.example.com/".to_string();
        assert_eq!(backend.ws_url(), "wss://detect.example.com/");
    }

    #[test]
    fn explicit_ws_url_wins() {
        let backend = BackendConfig {
            ws_url: Some("ws://stream.example.com/".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(backend.ws_url(), "ws://stream.example.com/");
    }

    #[test]
    fn deserializes_from_toml() {
        let config: FileConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://detect.example.com/"
            ws_url = "wss://stream.example.com/"
            timeout_secs = 15

            [log]
            transcript_dir = "/var/log/detect-auto"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://detect.example.com/");
        assert_eq!(config.backend.ws_url(), "wss://stream.example.com/");
        assert_eq!(config.backend.timeout_secs, 15);
        assert_eq!(
            config.log.transcript_dir.as_deref(),
            Some(std::path::Path::new("/var/log/detect-auto"))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = FileConfig {
            backend: BackendConfig {
                timeout_secs: 0,
                ..BackendConfig::default()
            },
            ..FileConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }
}
