//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Environment variables prefixed `SEATHOLD__` override file
//! values.

pub mod database;
pub mod engine;
pub mod logging;
pub mod realtime;
pub mod sweep;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::engine::{EngineConfig, RetryConfig};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::sweep::SweepConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration file plus environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Lock manager and hold lifecycle settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Durable expiry sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Live seat-update broadcast settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, applying `SEATHOLD__*`
    /// environment variable overrides on top.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SEATHOLD").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/seathold\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.database.url, "postgres://localhost/seathold");
        assert_eq!(cfg.engine.default_ttl_seconds, 600);
        assert_eq!(cfg.sweep.interval_seconds, 5);
        assert!(cfg.sweep.enabled);
        assert_eq!(cfg.logging.level, "info");
    }
}
