//! Configuration management
//!
//! This module handles loading and parsing configuration for the Motorent
//! client. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the rental backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the durable session token slot
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    PathBuf::from("data/session_token")
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        // Handle empty file - return defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - MOTORENT_API_BASE_URL
    /// - MOTORENT_API_TIMEOUT_SECONDS
    /// - MOTORENT_STORAGE_TOKEN_PATH
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("MOTORENT_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("MOTORENT_API_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.api.timeout_seconds = timeout;
            }
        }
        if let Ok(token_path) = std::env::var("MOTORENT_STORAGE_TOKEN_PATH") {
            self.storage.token_path = PathBuf::from(token_path);
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn clean_env() {
        std::env::remove_var("MOTORENT_API_BASE_URL");
        std::env::remove_var("MOTORENT_API_TIMEOUT_SECONDS");
        std::env::remove_var("MOTORENT_STORAGE_TOKEN_PATH");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.storage.token_path, PathBuf::from("data/session_token"));
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api:\n  timeout_seconds: 5\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        // Specified value
        assert_eq!(config.api.timeout_seconds, 5);
        // Default values
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.storage.token_path, PathBuf::from("data/session_token"));
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
api:
  base_url: "https://rental.example.com"
  timeout_seconds: 10
storage:
  token_path: "/var/lib/motorent/token"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.api.base_url, "https://rental.example.com");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(
            config.storage.token_path,
            PathBuf::from("/var/lib/motorent/token")
        );
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api:\n  timeout_seconds: not_a_number\n").unwrap();

        let result = Config::load(file.path());

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("parse") || err_msg.contains("invalid"));
    }

    #[test]
    fn test_load_malformed_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api:\n  base_url: [invalid yaml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_env_override_api_config() {
        let _guard = lock_env();
        clean_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api:\n  base_url: \"http://original:5000\"\n").unwrap();

        std::env::set_var("MOTORENT_API_BASE_URL", "http://overridden:9000");
        std::env::set_var("MOTORENT_API_TIMEOUT_SECONDS", "3");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://overridden:9000");
        assert_eq!(config.api.timeout_seconds, 3);

        clean_env();
    }

    #[test]
    fn test_env_override_storage_config() {
        let _guard = lock_env();
        clean_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        std::env::set_var("MOTORENT_STORAGE_TOKEN_PATH", "/tmp/motorent_token");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.storage.token_path, PathBuf::from("/tmp/motorent_token"));

        clean_env();
    }

    #[test]
    fn test_env_override_invalid_timeout_ignored() {
        let _guard = lock_env();
        clean_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api:\n  timeout_seconds: 30\n").unwrap();

        std::env::set_var("MOTORENT_API_TIMEOUT_SECONDS", "not_a_number");

        let config = Config::load_with_env(file.path()).unwrap();

        // Should keep original value when env var is invalid
        assert_eq!(config.api.timeout_seconds, 30);

        clean_env();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Strategy for generating valid base URLs
    fn valid_base_url_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("http://127.0.0.1:5000".to_string()),
            Just("http://localhost:5000".to_string()),
            Just("https://rental.example.com".to_string()),
            "[a-z][a-z0-9]{0,10}".prop_map(|host| format!("http://{}:8080", host)),
        ]
    }

    /// Strategy for generating valid timeouts
    fn valid_timeout_strategy() -> impl Strategy<Value = u64> {
        1u64..=600
    }

    /// Strategy for generating valid token paths
    fn valid_token_path_strategy() -> impl Strategy<Value = PathBuf> {
        prop_oneof![
            Just(PathBuf::from("data/session_token")),
            "[a-z][a-z0-9_/]{0,20}".prop_map(PathBuf::from),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// For any valid config structure, serializing to YAML and parsing
        /// back should yield an equivalent config.
        #[test]
        fn config_roundtrip(
            base_url in valid_base_url_strategy(),
            timeout in valid_timeout_strategy(),
            token_path in valid_token_path_strategy(),
        ) {
            let config = Config {
                api: ApiConfig { base_url: base_url.clone(), timeout_seconds: timeout },
                storage: StorageConfig { token_path: token_path.clone() },
            };

            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(parsed.api.base_url, base_url);
            prop_assert_eq!(parsed.api.timeout_seconds, timeout);
            prop_assert_eq!(parsed.storage.token_path, token_path);
        }

        /// Env vars take precedence over file values.
        #[test]
        fn env_precedence_over_file(
            file_timeout in 1u64..100,
            env_timeout in 100u64..200,
        ) {
            let _guard = lock_env();
            std::env::remove_var("MOTORENT_API_BASE_URL");
            std::env::remove_var("MOTORENT_API_TIMEOUT_SECONDS");
            std::env::remove_var("MOTORENT_STORAGE_TOKEN_PATH");

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "api:\n  timeout_seconds: {}\n", file_timeout)
                .expect("Failed to write config");

            std::env::set_var("MOTORENT_API_TIMEOUT_SECONDS", env_timeout.to_string());

            let config = Config::load_with_env(file.path()).expect("Failed to load config");

            prop_assert_eq!(config.api.timeout_seconds, env_timeout);
            prop_assert_ne!(config.api.timeout_seconds, file_timeout);

            std::env::remove_var("MOTORENT_API_TIMEOUT_SECONDS");
        }
    }
}
