//! Spin tuning constants.
//!
//! None of these carry deeper meaning than "the wheel looks right": enough
//! turns to hide the starting position, short enough that nobody waits long.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Configuration for the spin physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Per-reference-frame multiplicative velocity decay (default: 0.995)
    pub friction: f64,

    /// Frame rate the friction factor is expressed against (default: 60)
    pub reference_fps: f64,

    /// Angular velocity below which the wheel is considered stopped, rad/s (default: 0.2)
    pub stop_threshold: f64,

    /// Total rotation drawn per spin, in full turns (default: 4..8)
    pub turns: Range<f64>,

    /// Nominal spin duration drawn per spin, in seconds (default: 4..5.2)
    pub duration_secs: Range<f64>,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            friction: 0.995,
            reference_fps: 60.0,
            stop_threshold: 0.2,
            turns: 4.0..8.0,
            duration_secs: 4.0..5.2,
        }
    }
}

impl SpinConfig {
    /// Parses a (possibly partial) JSON override on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SpinConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks that the constants describe a spin that actually stops.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.friction.is_finite() && self.friction > 0.0 && self.friction < 1.0) {
            return Err(ConfigError::invalid(format!(
                "friction must be in (0, 1), got {}",
                self.friction
            )));
        }
        if !(self.reference_fps.is_finite() && self.reference_fps > 0.0) {
            return Err(ConfigError::invalid(format!(
                "reference_fps must be positive, got {}",
                self.reference_fps
            )));
        }
        if !(self.stop_threshold.is_finite() && self.stop_threshold > 0.0) {
            return Err(ConfigError::invalid(format!(
                "stop_threshold must be positive, got {}",
                self.stop_threshold
            )));
        }
        check_range("turns", &self.turns)?;
        check_range("duration_secs", &self.duration_secs)?;
        Ok(())
    }
}

fn check_range(name: &str, range: &Range<f64>) -> Result<(), ConfigError> {
    let ok = range.start.is_finite()
        && range.end.is_finite()
        && range.start > 0.0
        && range.start < range.end;
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(format!(
            "{name} must be a non-empty positive range, got {}..{}",
            range.start, range.end
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SpinConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.friction, 0.995);
        assert_eq!(config.stop_threshold, 0.2);
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let config = SpinConfig::from_json_str(r#"{ "stop_threshold": 0.5 }"#).unwrap();
        assert_eq!(config.stop_threshold, 0.5);
        assert_eq!(config.turns, 4.0..8.0);
    }

    #[test]
    fn test_json_ranges() {
        let config = SpinConfig::from_json_str(
            r#"{ "turns": { "start": 2.0, "end": 3.0 }, "duration_secs": { "start": 1.0, "end": 1.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.turns, 2.0..3.0);
        assert_eq!(config.duration_secs, 1.0..1.5);
    }

    #[test]
    fn test_rejects_friction_that_never_stops() {
        let err = SpinConfig::from_json_str(r#"{ "friction": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = SpinConfig {
            duration_secs: 5.0..4.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SpinConfig::from_json_str("{ friction: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
