//! Configuration loading and management for concise.
//!
//! Loads settings from `concise.toml` with an environment variable override
//! for the service endpoint. Every field has a default, so the tool also runs
//! without any config file at all.

use crate::controller::DEFAULT_MAX_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Remote summarization service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the summarization service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Summarization request defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// Maximum summary length sent with text requests
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

/// Reveal animation pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Delay between revealed characters, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub summarize: SummarizeConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}

fn default_interval_ms() -> u64 {
    50
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (concise.toml in cwd or
    /// home), falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::with_env_overrides(Self::default())),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(Self::with_env_overrides(config))
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from("concise.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("concise").join("concise.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Override the service endpoint from the environment
    fn with_env_overrides(mut config: Config) -> Config {
        if let Ok(url) = std::env::var("CONCISE_SERVICE_URL") {
            config.service.base_url = url;
        }
        config
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Reveal pacing as a Duration; tokio intervals reject a zero period
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal.interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_service_deployment() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:5001");
        assert_eq!(config.summarize.max_length, 200);
        assert_eq!(config.reveal_interval(), Duration::from_millis(50));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn loads_a_full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
base_url = "https://summarize.example.com"
timeout_secs = 10

[summarize]
max_length = 120

[reveal]
interval_ms = 25
"#
        )
        .unwrap();

        let config = Config::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.service.base_url, "https://summarize.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.summarize.max_length, 120);
        assert_eq!(config.reveal_interval(), Duration::from_millis(25));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[summarize]
max_length = 80
"#
        )
        .unwrap();

        let config = Config::load_from(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.summarize.max_length, 80);
        assert_eq!(config.service.base_url, "http://localhost:5001");
        assert_eq!(config.reveal.interval_ms, 50);
    }

    #[test]
    fn rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service").unwrap();

        assert!(matches!(
            Config::load_from(&file.path().to_path_buf()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
