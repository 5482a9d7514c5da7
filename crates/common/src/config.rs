//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Feed pagination limits.
    #[serde(default)]
    pub timeline: TimelineConfig,
    /// Trending topics configuration.
    #[serde(default)]
    pub trends: TrendsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Limits applied to every paginated feed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimelineConfig {
    /// Page size used when a request does not specify one.
    #[serde(default = "default_page_limit")]
    pub default_limit: u64,
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_page_limit")]
    pub max_limit: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_page_limit(),
        }
    }
}

impl TimelineConfig {
    /// Resolve a requested page size into the allowed range.
    #[must_use]
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .max(1)
            .min(self.max_limit)
    }
}

/// Trending topics configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrendsConfig {
    /// Insert the sample topic set on startup when no trends exist.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
    /// Number of trends returned when a request does not specify one.
    #[serde(default = "default_trend_limit")]
    pub default_limit: u64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            default_limit: default_trend_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_page_limit() -> u64 {
    20
}

const fn default_max_page_limit() -> u64 {
    100
}

const fn default_trend_limit() -> u64 {
    5
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `CHIRP_ENV`)
    /// 3. Environment variables with `CHIRP__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is the normal case outside local development.
        let _ = dotenvy::dotenv();

        let env = std::env::var("CHIRP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHIRP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CHIRP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
