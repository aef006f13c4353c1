//! Physics configuration
//!
//! Provides configuration for the collision/physics subsystem. Follows the
//! engine-wide convention: strongly typed, serializable (TOML), sensible
//! defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed
    #[error("failed to parse physics config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the physics subsystem
///
/// `pixels_per_unit` and `snap_to_pixels` control pixel-snapped bounding
/// area derivation for pixel-art games: when snapping is enabled, bounding
/// areas are expanded outward to the nearest pixel boundary so that sprites
/// rendered at integer pixel positions never poke out of their reported
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// How many screen pixels one world unit covers
    pub pixels_per_unit: f32,

    /// Whether bounding areas snap outward to pixel boundaries
    pub snap_to_pixels: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 32.0,
            snap_to_pixels: false,
        }
    }
}

impl PhysicsConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_does_not_snap() {
        let config = PhysicsConfig::default();
        assert_eq!(config.pixels_per_unit, 32.0);
        assert!(!config.snap_to_pixels);
    }

    #[test]
    fn config_parses_from_toml() {
        let config = PhysicsConfig::from_toml_str(
            "pixels_per_unit = 16.0\nsnap_to_pixels = true\n",
        )
        .unwrap();

        assert_eq!(config.pixels_per_unit, 16.0);
        assert!(config.snap_to_pixels);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = PhysicsConfig::from_toml_str("snap_to_pixels = true\n").unwrap();
        assert_eq!(config.pixels_per_unit, 32.0);
        assert!(config.snap_to_pixels);
    }
}
