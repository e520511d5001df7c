//! API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `KASIR_*` environment variables.
//!
//! ```toml
//! # kasir.toml
//! port = 8080
//! database_path = "/var/lib/kasir/kasir.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//! allow_negative_stock = false
//! ```

use std::env;
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use kasir_core::StockPolicy;
use kasir_db::DbConfig;

/// Default config file, overridable with `KASIR_CONFIG`.
pub const DEFAULT_CONFIG_FILE: &str = "kasir.toml";

/// API server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub max_connections: u32,

    /// How long a checkout waits for another checkout's write lock
    pub busy_timeout_ms: u64,

    /// Let checkout take stock below zero
    pub allow_negative_stock: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 8080,
            database_path: "kasir.db".to_string(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            allow_negative_stock: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from `KASIR_CONFIG` (or `kasir.toml`) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("KASIR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load configuration using `path` as the optional config file.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let settings = Config::builder()
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("busy_timeout_ms", defaults.busy_timeout_ms as i64)?
            .set_default("allow_negative_stock", defaults.allow_negative_stock)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("KASIR"))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        Ok(())
    }

    /// Pool settings for this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    /// Stock policy checkout runs under.
    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy::from_allow_negative(self.allow_negative_stock)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
