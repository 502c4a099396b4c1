//! Runtime measurement diagnostics.
//!
//! Counts how each cycle ended so a flaky sensor shows up in the log as a
//! ratio rather than as scattered error lines.  Counters only; nothing is
//! persisted and no reading is filtered.

use log::info;

use crate::error::{EdgePhase, MeasureError};
use crate::sensors::ultrasonic::MeasurementResult;

/// Per-outcome cycle counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasurementStats {
    pub cycles: u64,
    pub successes: u64,
    pub rise_timeouts: u64,
    pub fall_timeouts: u64,
    pub no_pulse: u64,
    pub pin_faults: u64,
}

impl MeasurementStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &MeasurementResult) {
        self.cycles += 1;
        match result {
            Ok(_) => self.successes += 1,
            Err(MeasureError::Timeout(EdgePhase::Rise)) => self.rise_timeouts += 1,
            Err(MeasureError::Timeout(EdgePhase::Fall)) => self.fall_timeouts += 1,
            Err(MeasureError::NoPulse) => self.no_pulse += 1,
            Err(MeasureError::Pin { .. }) => self.pin_faults += 1,
        }
    }

    pub fn failures(&self) -> u64 {
        self.cycles - self.successes
    }

    /// Share of cycles that produced a distance, 0.0 before the first cycle.
    pub fn success_ratio(&self) -> f32 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.successes as f32 / self.cycles as f32
    }

    pub fn log_summary(&self) {
        info!(
            "STATS | cycles={} ok={} ({:.0}%) | timeout rise={} fall={} | no_pulse={} | pin={}",
            self.cycles,
            self.successes,
            self.success_ratio() * 100.0,
            self.rise_timeouts,
            self.fall_timeouts,
            self.no_pulse,
            self.pin_faults,
        );
    }
}
