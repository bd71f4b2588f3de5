//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an absent file yields a usable
//! configuration.

pub mod holds;
pub mod logging;
pub mod simulator;
pub mod venue;

use serde::{Deserialize, Serialize};

pub use self::holds::HoldConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::simulator::SimulatorConfig;
pub use self::venue::VenueConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `BOXOFFICE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seating grid dimensions.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Hold expiration settings.
    #[serde(default)]
    pub holds: HoldConfig,
    /// Load simulator settings.
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with the `config/{env}.toml` overlay and
    /// environment variables prefixed with `BOXOFFICE__`, then validates
    /// the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOXOFFICE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the venue cannot be constructed with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.venue.rows == 0 {
            return Err(AppError::configuration("venue.rows must be at least 1"));
        }
        if self.venue.seats_per_row == 0 {
            return Err(AppError::configuration(
                "venue.seats_per_row must be at least 1",
            ));
        }
        if self.holds.ttl_millis == 0 {
            return Err(AppError::configuration("holds.ttl_millis must be positive"));
        }
        if self.holds.sweep_interval_millis == 0 {
            return Err(AppError::configuration(
                "holds.sweep_interval_millis must be positive",
            ));
        }
        if self.simulator.workers == 0 {
            return Err(AppError::configuration(
                "simulator.workers must be at least 1",
            ));
        }
        if self.simulator.max_seats_per_hold == 0 {
            return Err(AppError::configuration(
                "simulator.max_seats_per_hold must be at least 1",
            ));
        }
        self.logging.log_format()?;
        Ok(())
    }
}
