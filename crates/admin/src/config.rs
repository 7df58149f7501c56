//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_URL` - Origin of the catalog REST API (e.g., `http://localhost:8080/api/v1`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3002)
//! - `CATALOG_PAGE_SIZE` - Items per list page (default: 9)
//! - `SEARCH_DEBOUNCE_MS` - Quiet period before a search is sent (default: 300)
//! - `TOAST_DURATION_MS` - How long a toast stays visible (default: 5000)
//! - `API_TIMEOUT_SECS` - Catalog API request timeout (default: 30)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PAGE_SIZE: u32 = 9;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_TOAST_DURATION_MS: u64 = 5000;
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog API settings
    pub api: ApiConfig,
    /// List and notification timings
    pub ui: UiConfig,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Catalog REST API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Timings and sizes used by list views and toasts.
#[derive(Debug, Clone, Copy)]
pub struct UiConfig {
    /// Items per list page
    pub page_size: u32,
    /// Quiet period before a search-text change is sent
    pub search_debounce: Duration,
    /// How long a toast stays visible
    pub toast_duration: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
        }
    }
}

impl ApiConfig {
    /// API settings for a base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let base_url = parse_base_url(&env.required("CATALOG_API_URL")?)?;
        let host = env.parsed_or("ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = env.parsed_or("ADMIN_PORT", 3002_u16)?;

        let page_size = env.parsed_or("CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let ui = UiConfig {
            page_size,
            search_debounce: Duration::from_millis(
                env.parsed_or("SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?,
            ),
            toast_duration: Duration::from_millis(
                env.parsed_or("TOAST_DURATION_MS", DEFAULT_TOAST_DURATION_MS)?,
            ),
        };
        let api = ApiConfig {
            base_url,
            timeout: Duration::from_secs(env.parsed_or("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?),
        };

        Ok(Self {
            host,
            port,
            api,
            ui,
            json_logs: env
                .optional("LOG_FORMAT")
                .is_some_and(|f| f.eq_ignore_ascii_case("json")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env
                .optional("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: env
                .optional("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to a default when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse the API base URL, requiring an http(s) scheme.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CATALOG_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_api_url_is_set() {
        let config = config_from(&[("CATALOG_API_URL", "http://localhost:8080/api/v1")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3002");
        assert_eq!(config.ui.page_size, 9);
        assert_eq!(config.ui.search_debounce, Duration::from_millis(300));
        assert_eq!(config.ui.toast_duration, Duration::from_millis(5000));
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(!config.json_logs);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url_is_reported() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CATALOG_API_URL"));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = config_from(&[
            ("CATALOG_API_URL", "http://localhost:8080"),
            ("ADMIN_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ADMIN_PORT"));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let err = config_from(&[("CATALOG_API_URL", "ftp://files.example.com")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = config_from(&[
            ("CATALOG_API_URL", "http://localhost:8080"),
            ("CATALOG_PAGE_SIZE", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CATALOG_PAGE_SIZE"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("CATALOG_API_URL", "https://catalog.example.com/api/v1/"),
            ("ADMIN_HOST", "0.0.0.0"),
            ("ADMIN_PORT", "8000"),
            ("CATALOG_PAGE_SIZE", "12"),
            ("SEARCH_DEBOUNCE_MS", "150"),
            ("TOAST_DURATION_MS", "2000"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
        assert_eq!(config.ui.page_size, 12);
        assert_eq!(config.ui.search_debounce, Duration::from_millis(150));
        assert_eq!(config.ui.toast_duration, Duration::from_millis(2000));
        assert!(config.json_logs);
    }
}
