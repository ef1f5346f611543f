//! Configuration management
//!
//! This module handles loading and parsing configuration for the FU News front-end.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend API configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST/OData backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Path prefix of OData read endpoints
    #[serde(default = "default_odata_prefix")]
    pub odata_prefix: String,
    /// Path prefix of REST write endpoints
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            odata_prefix: default_odata_prefix(),
            api_prefix: default_api_prefix(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_odata_prefix() -> String {
    "odata".to_string()
}

fn default_api_prefix() -> String {
    "api".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds (also the cookie Max-Age)
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Refresh the backend token when it expires within this many seconds
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_seconds: i64,
    /// Mark the cookie `Secure`
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_seconds: default_session_ttl(),
            refresh_margin_seconds: default_refresh_margin(),
            secure: false,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_cookie_name() -> String {
    "funews_session".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_margin() -> i64 {
    60
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Site name shown in the layout
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Articles per page on public listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Rows per page on admin listings
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: u32,
    /// Live search debounce delay in milliseconds
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
    /// Maximum suggestions returned by live search
    #[serde(default = "default_live_search_limit")]
    pub live_search_limit: u32,
    /// Directory of template overrides; embedded templates fill the gaps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            page_size: default_page_size(),
            admin_page_size: default_admin_page_size(),
            search_debounce_ms: default_search_debounce(),
            live_search_limit: default_live_search_limit(),
            templates_dir: None,
        }
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn default_site_name() -> String {
    "FU News".to_string()
}

fn default_page_size() -> u32 {
    12
}

fn default_admin_page_size() -> u32 {
    10
}

fn default_search_debounce() -> u64 {
    300
}

fn default_live_search_limit() -> u32 {
    5
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
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
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

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - FUNEWS_SERVER_HOST
    /// - FUNEWS_SERVER_PORT
    /// - FUNEWS_BACKEND_BASE_URL
    /// - FUNEWS_BACKEND_TIMEOUT_SECONDS
    /// - FUNEWS_SESSION_COOKIE_NAME
    /// - FUNEWS_SESSION_TTL_SECONDS
    /// - FUNEWS_SESSION_SECURE
    /// - FUNEWS_UI_PAGE_SIZE
    /// - FUNEWS_UI_SITE_NAME
    ///
    /// The merged result is validated before it is returned.
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FUNEWS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FUNEWS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("FUNEWS_BACKEND_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Ok(timeout) = std::env::var("FUNEWS_BACKEND_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.backend.timeout_seconds = timeout;
            }
        }

        if let Ok(name) = std::env::var("FUNEWS_SESSION_COOKIE_NAME") {
            self.session.cookie_name = name;
        }
        if let Ok(ttl) = std::env::var("FUNEWS_SESSION_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.session.ttl_seconds = ttl;
            }
        }
        if let Ok(secure) = std::env::var("FUNEWS_SESSION_SECURE") {
            match secure.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.session.secure = true,
                "false" | "0" | "no" => self.session.secure = false,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(size) = std::env::var("FUNEWS_UI_PAGE_SIZE") {
            if let Ok(size) = size.parse::<u32>() {
                self.ui.page_size = size;
            }
        }
        if let Ok(name) = std::env::var("FUNEWS_UI_SITE_NAME") {
            self.ui.site_name = name;
        }
    }

    /// Reject values the front-end cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui.page_size == 0 || self.ui.admin_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "ui page sizes must be greater than zero".to_string(),
            ));
        }
        let url = self.backend.base_url.to_lowercase();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "session.cookie_name cannot be empty".to_string(),
            ));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    const ENV_KEYS: &[&str] = &[
        "FUNEWS_SERVER_HOST",
        "FUNEWS_SERVER_PORT",
        "FUNEWS_BACKEND_BASE_URL",
        "FUNEWS_BACKEND_TIMEOUT_SECONDS",
        "FUNEWS_SESSION_COOKIE_NAME",
        "FUNEWS_SESSION_TTL_SECONDS",
        "FUNEWS_SESSION_SECURE",
        "FUNEWS_UI_PAGE_SIZE",
        "FUNEWS_UI_SITE_NAME",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(std::path::Path::new("/nonexistent/funews/config.yml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.session.cookie_name, "funews_session");
        assert_eq!(config.ui.page_size, 12);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "   \n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ui.site_name, "FU News");
        assert_eq!(config.backend.timeout_seconds, 30);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "backend:\n  base_url: \"https://news.example.edu\"\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://news.example.edu");
        assert_eq!(config.backend.odata_prefix, "odata");
        assert_eq!(config.backend.api_prefix, "api");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ui.admin_page_size, 10);
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8081
backend:
  base_url: "http://backend:5000"
  timeout_seconds: 5
  odata_prefix: "o"
  api_prefix: "rest"
session:
  cookie_name: "sid"
  ttl_seconds: 600
  refresh_margin_seconds: 10
  secure: true
ui:
  site_name: "Campus News"
  page_size: 6
  admin_page_size: 20
  search_debounce_ms: 150
  live_search_limit: 3
"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", yaml).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.api_prefix, "rest");
        assert_eq!(config.session.cookie_name, "sid");
        assert!(config.session.secure);
        assert_eq!(config.session.ttl(), Duration::from_secs(600));
        assert_eq!(config.ui.site_name, "Campus News");
        assert_eq!(config.ui.search_debounce(), Duration::from_millis(150));
        assert_eq!(config.ui.live_search_limit, 3);
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: \"not a number\"\n").unwrap();

        let err = Config::load(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.ui.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_backend() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://files.example.edu".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("backend.base_url"));
    }

    #[test]
    fn test_env_override_values() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  host: \"original\"\n  port: 1234\n").unwrap();

        std::env::set_var("FUNEWS_SERVER_HOST", "10.0.0.1");
        std::env::set_var("FUNEWS_BACKEND_BASE_URL", "https://api.funews.test");
        std::env::set_var("FUNEWS_SESSION_SECURE", "yes");
        std::env::set_var("FUNEWS_UI_PAGE_SIZE", "24");

        let config = Config::load_with_env(file.path()).unwrap();
        clear_env();

        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.backend.base_url, "https://api.funews.test");
        assert!(config.session.secure);
        assert_eq!(config.ui.page_size, 24);
    }

    #[test]
    fn test_env_override_invalid_numbers_ignored() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FUNEWS_SERVER_PORT", "not-a-port");
        std::env::set_var("FUNEWS_BACKEND_TIMEOUT_SECONDS", "-3");
        std::env::set_var("FUNEWS_SESSION_SECURE", "maybe");

        let config = Config::load_with_env(std::path::Path::new("/nonexistent/config.yml")).unwrap();
        clear_env();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.timeout_seconds, 30);
        assert!(!config.session.secure);
    }

    #[test]
    fn test_env_override_failing_validation_is_error() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FUNEWS_BACKEND_BASE_URL", "localhost:5000");
        let result = Config::load_with_env(std::path::Path::new("/nonexistent/config.yml"));
        clear_env();

        assert!(result.is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn config_strategy() -> impl Strategy<Value = Config> {
            (
                "[a-z][a-z0-9.]{0,19}",
                1u16..=65535,
                "https?://[a-z]{3,12}(:[0-9]{2,4})?",
                1u64..=600,
                "[a-z_]{3,16}",
                1u32..=100,
                "[A-Za-z][A-Za-z ]{0,18}[A-Za-z]",
            )
                .prop_map(|(host, port, url, timeout, cookie, size, name)| {
                    let mut config = Config::default();
                    config.server.host = host;
                    config.server.port = port;
                    config.backend.base_url = url;
                    config.backend.timeout_seconds = timeout;
                    config.session.cookie_name = cookie;
                    config.ui.page_size = size;
                    config.ui.site_name = name;
                    config
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// Serializing a config to YAML and loading it back preserves every field.
            #[test]
            fn config_yaml_roundtrip(config in config_strategy()) {
                let yaml = serde_yaml::to_string(&config).unwrap();
                let mut file = NamedTempFile::new().unwrap();
                write!(file, "{}", yaml).unwrap();

                let loaded = Config::load(file.path()).unwrap();
                prop_assert_eq!(&loaded.server.host, &config.server.host);
                prop_assert_eq!(loaded.server.port, config.server.port);
                prop_assert_eq!(&loaded.backend.base_url, &config.backend.base_url);
                prop_assert_eq!(loaded.backend.timeout_seconds, config.backend.timeout_seconds);
                prop_assert_eq!(&loaded.session.cookie_name, &config.session.cookie_name);
                prop_assert_eq!(loaded.ui.page_size, config.ui.page_size);
                prop_assert_eq!(&loaded.ui.site_name, &config.ui.site_name);
                prop_assert!(loaded.validate().is_ok());
            }
        }
    }
}
