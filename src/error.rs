//! Unified error types for the TankLevel firmware.
//!
//! A single top-level [`Error`] that every subsystem converts into, plus
//! the per-cycle [`MeasureError`] taxonomy returned by the ultrasonic
//! driver.  All variants are `Copy` so a failed reading can be handed to
//! the event sink and the diagnostics counters without allocation.

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.  Fatal: no measurement is attempted.
    Setup(&'static str),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// A single measurement cycle failed.
    Measure(MeasureError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(msg) => write!(f, "setup: {msg}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Measure(e) => write!(f, "measure: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MeasureError> for Error {
    fn from(e: MeasureError) -> Self {
        Self::Measure(e)
    }
}

// ---------------------------------------------------------------------------
// Measurement errors
// ---------------------------------------------------------------------------

/// Which edge the driver was waiting for when the budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgePhase {
    /// Waiting for the echo line to go high.
    Rise,
    /// Waiting for the echo line to return low.
    Fall,
}

impl fmt::Display for EdgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rise => write!(f, "waiting for echo high"),
            Self::Fall => write!(f, "waiting for echo low"),
        }
    }
}

/// The two lines of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorLine {
    Trigger,
    Echo,
}

impl fmt::Display for SensorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Echo => write!(f, "echo"),
        }
    }
}

/// Classified failure of one trigger/echo cycle.
///
/// Every variant is recoverable: the caller reports it and moves on to the
/// next scheduled cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureError {
    /// The echo line never made the expected transition within the timeout.
    /// Usually a disconnected sensor, a target out of range, or bad wiring.
    Timeout(EdgePhase),
    /// An echo was observed but its high phase measured zero.  Spurious edge.
    NoPulse,
    /// A GPIO operation on one of the lines returned an error.
    Pin { line: SensorLine, kind: ErrorKind },
}

impl MeasureError {
    pub(crate) fn pin<E: embedded_hal::digital::Error>(line: SensorLine, e: &E) -> Self {
        Self::Pin { line, kind: e.kind() }
    }
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(phase) => write!(f, "timeout {phase}"),
            Self::NoPulse => write!(f, "no pulse detected"),
            Self::Pin { line, kind } => write!(f, "{line} pin fault: {kind}"),
        }
    }
}

impl std::error::Error for MeasureError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
