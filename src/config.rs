//! # Vehicle Profile Configuration
//!
//! Named vehicle motion profiles loaded from a TOML file.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [vehicle.loaded]
//! max_speed = 1.6
//! acceleration = 0.5
//! deceleration = -0.5
//! jerk_acceleration_up = 1.0
//! jerk_acceleration_down = -1.0
//! jerk_deceleration_up = -1.0
//! jerk_deceleration_down = 1.0
//!
//! [vehicle.empty]
//! max_speed = 2.0
//! acceleration = 0.8
//! deceleration = -0.8
//! jerk_acceleration_up = 1.6
//! jerk_acceleration_down = -1.6
//! jerk_deceleration_up = -1.6
//! jerk_deceleration_down = 1.6
//! ```
//!
//! Tolerance fields are optional and default to zero.
//! Every profile is validated on load, so a successfully loaded
//! [`ProfileConfig`] only hands out usable [`VehicleMotionProperties`].

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::vehicle::VehicleMotionProperties;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid profile '{profile}': {reason}")]
    Invalid { profile: String, reason: String },
}

/// Root of the profile file: a map of profile name to motion properties.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub vehicle: HashMap<String, VehicleMotionProperties>,
}

impl ProfileConfig {
    /// Parse and validate a TOML profile document.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ProfileConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML profile file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).inspect_err(|e| {
            tracing::error!("Failed to read profile file '{}': {}", path.display(), e);
        })?;
        Self::from_str(&contents).inspect_err(|e| {
            tracing::error!("Failed to load profile file '{}': {}", path.display(), e);
        })
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Option<&VehicleMotionProperties> {
        self.vehicle.get(name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, props) in &self.vehicle {
            props.validate().map_err(|e| ConfigError::Invalid {
                profile: name.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
