//! Instrument directory configuration
//!
//! Loaded from an optional TOML file layered under `INSTRUMENT_DIRECTORY__*`
//! environment variables, e.g. `INSTRUMENT_DIRECTORY__CACHE__TTL_HOURS=12`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Upstream catalog served as a gzip-compressed JSON array
pub const DEFAULT_CATALOG_URL: &str =
    "https://assets.upstox.com/market-quote/instruments/exchange/complete.json.gz";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "INSTRUMENT_DIRECTORY";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TTL_HOURS: u64 = 24;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Top-level directory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Catalog download settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Snapshot staleness and background refresh
    #[serde(default)]
    pub cache: CacheConfig,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog URL
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// User-Agent header; defaults to `<crate>/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Cache staleness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum snapshot age before it is considered stale
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    /// How often the background task checks staleness
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Run the background staleness check in `serve` mode
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
    /// Result cap for searches that do not pass one
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            user_agent: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            check_interval_secs: default_check_interval_secs(),
            auto_refresh: default_auto_refresh(),
            default_search_limit: default_search_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

const fn default_ttl_hours() -> u64 {
    DEFAULT_TTL_HOURS
}

const fn default_check_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

const fn default_auto_refresh() -> bool {
    true
}

const fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_log_filter() -> String {
    "instrument_directory=info".to_string()
}

impl DirectoryConfig {
    /// Load configuration from `path` (if it exists) plus environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl CatalogConfig {
    /// Connect timeout as a `Duration`
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a `Duration`
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Effective User-Agent header value
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        })
    }
}

impl CacheConfig {
    /// Snapshot time-to-live
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        i64::try_from(self.ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Background check period, never shorter than one second
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        if self.check_interval_secs == 0 {
            return Duration::from_secs(1);
        }
        Duration::from_secs(self.check_interval_secs)
    }
}
