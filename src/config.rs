//! Matcher configuration.
//!
//! A configuration is supplied once, when the matcher is constructed,
//! and is fixed for the matcher's lifetime. Every key is optional:
//!
//! ```json
//! {
//!   "mode": "auto",
//!   "grid": { "cache_size": 100240, "size": 500 },
//!   "default": { "sigma_z": 4.07, "beta": 3, "breakage_distance": 2000 }
//! }
//! ```

use crate::error::ConfigError;

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumString};

/// The travel mode, used to filter the edges that may be matched
/// onto and routed across.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Bicycle,
    Pedestrian,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub mode: Mode,
    pub grid: GridConfig,
    pub default: MatchOptions,
}

/// Sizing of the Candidate Index grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum number of loaded cells retained.
    pub cache_size: usize,

    /// Cell edge length, in meters.
    pub size: f64,
}

/// Matching parameters. All distances are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub gps_accuracy: f64,
    pub search_radius: f64,
    pub max_search_radius: f64,

    /// Standard deviation of the emission gaussian.
    pub sigma_z: f64,

    /// Scale of the exponential transition distribution.
    pub beta: f64,

    pub breakage_distance: f64,
    pub turn_penalty_factor: f64,
    pub max_route_distance_factor: f64,

    /// Measurements closer than this to the previous matched
    /// measurement are placed onto the path rather than matched.
    pub interpolation_distance: f64,

    pub route: bool,
    pub geometry: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cache_size: 100_240,
            size: 500.0,
        }
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            gps_accuracy: 5.0,
            search_radius: 50.0,
            max_search_radius: 100.0,
            sigma_z: 4.07,
            beta: 3.0,
            breakage_distance: 2000.0,
            turn_penalty_factor: 0.0,
            max_route_distance_factor: 5.0,
            interpolation_distance: 10.0,
            route: true,
            geometry: false,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            grid: GridConfig::default(),
            default: MatchOptions::default(),
        }
    }
}

impl MatcherConfig {
    /// Parses and validates a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatcherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Rejects option values which cannot produce a meaningful match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.cache_size == 0 {
            return Err(ConfigError::EmptyCache);
        }

        let options = &self.default;
        for (key, value) in [
            ("grid.size", self.grid.size),
            ("default.sigma_z", options.sigma_z),
            ("default.beta", options.beta),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { key, value });
            }
        }

        for (key, value) in [
            ("default.gps_accuracy", options.gps_accuracy),
            ("default.search_radius", options.search_radius),
            ("default.max_search_radius", options.max_search_radius),
            ("default.breakage_distance", options.breakage_distance),
            ("default.turn_penalty_factor", options.turn_penalty_factor),
            ("default.max_route_distance_factor", options.max_route_distance_factor),
            ("default.interpolation_distance", options.interpolation_distance),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { key, value });
            }
        }

        if options.search_radius > options.max_search_radius {
            return Err(ConfigError::RadiusAboveMaximum {
                search: options.search_radius,
                max: options.max_search_radius,
            });
        }

        Ok(())
    }
}
