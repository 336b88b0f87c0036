//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::CategoryDeletePolicy;
use record_store::DEFAULT_TIMEOUT;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset selects the
///   in-memory store
/// - `STORE_TIMEOUT_SECS`: bound on each store call (default: `30`)
/// - `CATEGORY_DELETE_POLICY`: `allow` or `restrict` (default: `allow`)
/// - `UNIQUE_PROPERTY_NAMES`: `true` to reject duplicate property names
///
/// Unparsable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub store_timeout: Duration,
    pub category_delete_policy: CategoryDeletePolicy,
    pub unique_property_names: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match non_empty("LOG_FORMAT") {
                Some(format) if format.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => defaults.log_format,
            },
            database_url: non_empty("DATABASE_URL"),
            store_timeout: non_empty("STORE_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_timeout),
            category_delete_policy: non_empty("CATEGORY_DELETE_POLICY")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.category_delete_policy),
            unique_property_names: non_empty("UNIQUE_PROPERTY_NAMES")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(defaults.unique_property_names),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            store_timeout: DEFAULT_TIMEOUT,
            category_delete_policy: CategoryDeletePolicy::Allow,
            unique_property_names: false,
        }
    }
}
