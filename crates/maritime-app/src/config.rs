//! Application configuration.
//!
//! Every field has a default equal to the built-in constants, so an empty
//! file (or no file) runs the standard operation.
//!
//! ```toml
//! [route]
//! source = { lat = 13.0827, lon = 80.2707 }
//! destination = { lat = 13.094861, lon = 80.522232 }
//! boundary_radius_m = 1000.0
//!
//! [timing]
//! engine_start_delay_ms = 3000
//! leg_duration_ms = 10000
//! return_pause_ms = 3000
//! frame_interval_ms = 16
//!
//! [verification]
//! accepted_hin = "IN7784"
//!
//! [database]
//! url = "https://example-default-rtdb.firebaseio.com"
//! project_id = "example"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use maritime_core::constants::*;
use maritime_core::types::Position;
use maritime_sim::SimConfig;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub route: RouteConfig,
    pub timing: TimingConfig,
    pub verification: VerificationConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    pub source: Position,
    pub destination: Position,
    pub boundary_radius_m: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            source: SOURCE_POSITION,
            destination: DESTINATION_POSITION,
            boundary_radius_m: BOUNDARY_RADIUS_M,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub engine_start_delay_ms: u64,
    pub leg_duration_ms: u64,
    pub return_pause_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            engine_start_delay_ms: ENGINE_START_DELAY_MS,
            leg_duration_ms: LEG_DURATION_MS,
            return_pause_ms: RETURN_PAUSE_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationConfig {
    pub accepted_hin: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            accepted_hin: ACCEPTED_HIN.to_string(),
        }
    }
}

/// Realtime database connection. Parsed and validated, not used by the
/// operation itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub project_id: Option<String>,
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        for (name, p) in [
            ("route.source", self.route.source),
            ("route.destination", self.route.destination),
        ] {
            if !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lon) {
                return Err(ConfigError::Invalid(format!(
                    "{name} ({}, {}) is not a valid coordinate",
                    p.lat, p.lon
                )));
            }
        }
        if self.route.source == self.route.destination {
            return invalid("route.source and route.destination must differ");
        }
        if !(self.route.boundary_radius_m > 0.0) {
            return invalid("route.boundary_radius_m must be positive");
        }
        if self.timing.leg_duration_ms == 0 {
            return invalid("timing.leg_duration_ms must be greater than zero");
        }
        if self.timing.frame_interval_ms == 0 {
            return invalid("timing.frame_interval_ms must be greater than zero");
        }
        if self.verification.accepted_hin.is_empty() {
            return invalid("verification.accepted_hin must not be empty");
        }
        if let Some(url) = &self.database.url {
            if !url.starts_with("https://") {
                return invalid("database.url must be an https URL");
            }
        }
        Ok(())
    }

    /// Engine configuration derived from this file.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            source: self.route.source,
            destination: self.route.destination,
            boundary_radius_m: self.route.boundary_radius_m,
            engine_start_delay_ms: self.timing.engine_start_delay_ms,
            leg_duration_ms: self.timing.leg_duration_ms,
            return_pause_ms: self.timing.return_pause_ms,
            frame_interval_ms: self.timing.frame_interval_ms,
            accepted_hin: self.verification.accepted_hin.clone(),
        }
    }
}
