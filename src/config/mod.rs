//! Configuration management
//!
//! This module handles loading and parsing configuration for the Vocero
//! front end. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Static host configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Image upload limits
    #[serde(default)]
    pub upload: UploadConfig,
    /// Session persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Static host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built front-end bundle
    #[serde(default = "default_dist_path")]
    pub dist_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dist_path: default_dist_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4200
}

fn default_dist_path() -> PathBuf {
    PathBuf::from("dist/web-comunitaria/browser")
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the news API
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

/// Image upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum file size in bytes (default: 5MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/png".to_string(),
        "image/jpeg".to_string(),
        "image/jpg".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON session file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/session.json")
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

        // Empty file - defaults
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
    /// - VOCERO_SERVER_HOST
    /// - VOCERO_SERVER_PORT
    /// - VOCERO_SERVER_DIST_PATH
    /// - VOCERO_API_BASE_URL
    /// - VOCERO_API_TIMEOUT_SECS
    /// - VOCERO_STORAGE_PATH
    ///
    /// The bare `PORT` variable is also honored for deployment platforms
    /// that set it; `VOCERO_SERVER_PORT` takes precedence.
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(host) = std::env::var("VOCERO_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("VOCERO_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(dist) = std::env::var("VOCERO_SERVER_DIST_PATH") {
            self.server.dist_path = PathBuf::from(dist);
        }
        if let Ok(base_url) = std::env::var("VOCERO_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("VOCERO_API_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.api.timeout_secs = timeout;
            }
        }
        if let Ok(path) = std::env::var("VOCERO_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
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

    const ALL_ENV_VARS: &[&str] = &[
        "PORT",
        "VOCERO_SERVER_HOST",
        "VOCERO_SERVER_PORT",
        "VOCERO_SERVER_DIST_PATH",
        "VOCERO_API_BASE_URL",
        "VOCERO_API_TIMEOUT_SECS",
        "VOCERO_STORAGE_PATH",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for var in ALL_ENV_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4200);
        assert_eq!(
            config.server.dist_path,
            PathBuf::from("dist/web-comunitaria/browser")
        );
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.upload.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.storage.path, PathBuf::from("data/session.json"));
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4200);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 3000\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        // Specified value
        assert_eq!(config.server.port, 3000);
        // Default values
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9000
  dist_path: "public"
api:
  base_url: "https://noticias.example.com/api"
  timeout_secs: 10
upload:
  max_file_size: 1048576
  allowed_types: ["image/png"]
storage:
  path: "state/session.json"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.dist_path, PathBuf::from("public"));
        assert_eq!(config.api.base_url, "https://noticias.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.upload.max_file_size, 1048576);
        assert_eq!(config.upload.allowed_types, vec!["image/png"]);
        assert_eq!(config.storage.path, PathBuf::from("state/session.json"));
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let result = Config::load(file.path());

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("parse") || err_msg.contains("invalid"));
    }

    #[test]
    fn test_load_malformed_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  host: [invalid yaml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_env_override_server_config() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  host: \"0.0.0.0\"\n  port: 4200\n").unwrap();

        std::env::set_var("VOCERO_SERVER_HOST", "192.168.1.1");
        std::env::set_var("VOCERO_SERVER_PORT", "4000");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 4000);

        std::env::remove_var("VOCERO_SERVER_HOST");
        std::env::remove_var("VOCERO_SERVER_PORT");
    }

    #[test]
    fn test_bare_port_honored_with_lower_precedence() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        std::env::set_var("PORT", "8081");
        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.server.port, 8081);

        std::env::set_var("VOCERO_SERVER_PORT", "9090");
        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);

        std::env::remove_var("PORT");
        std::env::remove_var("VOCERO_SERVER_PORT");
    }

    #[test]
    fn test_env_override_api_and_storage() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        std::env::set_var("VOCERO_API_BASE_URL", "http://api.internal/api");
        std::env::set_var("VOCERO_API_TIMEOUT_SECS", "5");
        std::env::set_var("VOCERO_STORAGE_PATH", "/tmp/session.json");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://api.internal/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/session.json"));

        std::env::remove_var("VOCERO_API_BASE_URL");
        std::env::remove_var("VOCERO_API_TIMEOUT_SECS");
        std::env::remove_var("VOCERO_STORAGE_PATH");
    }

    #[test]
    fn test_env_invalid_numbers_ignored() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        std::env::set_var("VOCERO_SERVER_PORT", "not-a-port");
        std::env::set_var("VOCERO_API_TIMEOUT_SECS", "soon");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.server.port, 4200);
        assert_eq!(config.api.timeout_secs, 30);

        std::env::remove_var("VOCERO_SERVER_PORT");
        std::env::remove_var("VOCERO_API_TIMEOUT_SECS");
    }

    #[test]
    fn test_upload_type_allow_list() {
        let config = UploadConfig::default();
        assert!(config.is_type_allowed("image/png"));
        assert!(config.is_type_allowed("image/webp"));
        assert!(!config.is_type_allowed("text/plain"));
        assert!(!config.is_type_allowed("image/svg+xml"));
    }
}
