//! Measurement configuration parameters
//!
//! All tunable parameters for one trigger/echo cycle and the outer
//! sampling loop.  Every field has a default; an embedding caller can
//! override any subset from a JSON document.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Where the echo high-phase window starts.
///
/// The legacy firmware re-stamped the start time on every low sample
/// while waiting for the rise, so the window opens at the last low sample
/// before the edge.  `RiseObserved` opens it when the rise is seen instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseStart {
    #[default]
    LastLowSample,
    RiseObserved,
}

/// Configuration for the ultrasonic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    // --- Trigger ---
    /// Width of the trigger pulse (microseconds)
    pub pulse_duration_us: u32,

    // --- Echo ---
    /// Maximum wait for any single echo edge (microseconds)
    pub measurement_timeout_us: u64,
    /// Anchor of the measured high-phase window
    pub pulse_start: PulseStart,

    // --- Conversion ---
    /// Speed of sound in the medium (cm/µs)
    pub sound_speed_cm_per_us: f64,

    // --- Timing ---
    /// Period of the outer sampling loop (milliseconds)
    pub measurement_interval_ms: u32,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            pulse_duration_us: 10,
            measurement_timeout_us: 1_000_000, // 1 s
            pulse_start: PulseStart::LastLowSample,
            sound_speed_cm_per_us: 0.0343, // air, ~20 °C
            measurement_interval_ms: 1000, // 1 Hz
        }
    }
}

impl MeasurementConfig {
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.pulse_duration_us))
    }

    pub fn measurement_timeout(&self) -> Duration {
        Duration::from_micros(self.measurement_timeout_us)
    }

    pub fn measurement_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.measurement_interval_ms))
    }

    /// Reject values that would make a measurement meaningless or unbounded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_duration_us == 0 {
            return Err(ConfigError::ValidationFailed("pulse_duration_us must be > 0"));
        }
        if self.measurement_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("measurement_timeout_us must be > 0"));
        }
        if self.measurement_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("measurement_interval_ms must be > 0"));
        }
        if !self.sound_speed_cm_per_us.is_finite() || self.sound_speed_cm_per_us <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "sound_speed_cm_per_us must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Parse a JSON override document.  Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config parse failed: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }
}
