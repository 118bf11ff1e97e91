//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_PRODUCTS_URL` - Published CSV export of the products sheet
//! - `CATALOG_CATEGORIES_URL` - Published CSV export of the categories sheet
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory for the local cache store (default: .data)
//! - `STOREFRONT_CACHE_PREFIX` - Prefix for cache keys (default: fofurices)
//! - `STOREFRONT_NAME` - Shop name shown in the layout (default: Fofurices)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `CATALOG_REFRESH_SECS` - Background refresh period, 0 disables (default: 300)
//! - `CATALOG_MIN_LOAD_DELAY_MS` - Minimum startup load time (default: 400)
//! - `CATALOG_STARTUP_WAIT_SECS` - Max wait for the first refresh (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shop name rendered in the layout
    pub store_name: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Spreadsheet sources and refresh timing
    pub catalog: CatalogConfig,
    /// Local cache store settings
    pub cache: CacheConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where the catalog comes from and how often it is reloaded.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// CSV export of the products sheet
    pub products_url: Url,
    /// CSV export of the categories sheet
    pub categories_url: Url,
    /// Background refresh period; `None` disables background refresh
    pub refresh_interval: Option<Duration>,
    /// Minimum time the startup load takes, even with a warm cache
    pub min_load_delay: Duration,
    /// How long startup waits for the first network refresh
    pub startup_wait: Duration,
}

/// Local cache store settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding one JSON document per key
    pub data_dir: PathBuf,
    /// Prefix applied to every key
    pub key_prefix: String,
}

impl StorefrontConfig {
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

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let store_name = get_env_or_default("STOREFRONT_NAME", "Fofurices");
        let log_format = match get_env_or_default("STOREFRONT_LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_LOG_FORMAT".to_string(),
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            store_name,
            log_format,
            catalog: CatalogConfig::from_env()?,
            cache: CacheConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration with default settings around the given catalog sources.
    ///
    /// Sentry is disabled and the cache lives in `.data`.
    #[must_use]
    pub fn new(catalog: CatalogConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            store_name: "Fofurices".to_string(),
            log_format: LogFormat::Pretty,
            catalog,
            cache: CacheConfig {
                data_dir: PathBuf::from(".data"),
                key_prefix: "fofurices".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    /// Sources with the default timings and background refresh disabled.
    #[must_use]
    pub const fn new(products_url: Url, categories_url: Url) -> Self {
        Self {
            products_url,
            categories_url,
            refresh_interval: None,
            min_load_delay: Duration::from_millis(400),
            startup_wait: Duration::from_secs(15),
        }
    }

    /// Load the catalog settings on their own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL is missing or not http(s), or a timing
    /// value is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let refresh_secs: u64 = parse_env("CATALOG_REFRESH_SECS", "300")?;
        let min_delay_ms: u64 = parse_env("CATALOG_MIN_LOAD_DELAY_MS", "400")?;
        let startup_wait_secs: u64 = parse_env("CATALOG_STARTUP_WAIT_SECS", "15")?;

        Ok(Self {
            products_url: get_source_url("CATALOG_PRODUCTS_URL")?,
            categories_url: get_source_url("CATALOG_CATEGORIES_URL")?,
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
            min_load_delay: Duration::from_millis(min_delay_ms),
            startup_wait: Duration::from_secs(startup_wait_secs),
        })
    }
}

impl CacheConfig {
    /// Load the cache settings on their own (used by the CLI).
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", ".data")),
            key_prefix: get_env_or_default("STOREFRONT_CACHE_PREFIX", "fofurices"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required spreadsheet export URL.
fn get_source_url(key: &str) -> Result<Url, ConfigError> {
    validate_source_url(key, &get_required_env(key)?)
}

/// Validate that a source URL parses and uses http(s).
fn validate_source_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_url_accepts_https() {
        let url = validate_source_url(
            "TEST_URL",
            "https://docs.google.com/spreadsheets/d/e/abc/pub?gid=1&single=true&output=csv",
        )
        .unwrap();
        assert_eq!(url.host_str(), Some("docs.google.com"));
    }

    #[test]
    fn test_validate_source_url_rejects_other_schemes() {
        let err = validate_source_url("TEST_URL", "ftp://example.com/sheet.csv").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = validate_source_url("TEST_URL", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::new(CatalogConfig::new(
            Url::parse("http://localhost/p.csv").unwrap(),
            Url::parse("http://localhost/c.csv").unwrap(),
        ));

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_catalog_defaults() {
        let catalog = CatalogConfig::new(
            Url::parse("http://localhost/p.csv").unwrap(),
            Url::parse("http://localhost/c.csv").unwrap(),
        );
        assert_eq!(catalog.min_load_delay, Duration::from_millis(400));
        assert_eq!(catalog.startup_wait, Duration::from_secs(15));
        assert!(catalog.refresh_interval.is_none());
    }
}
