//! Application service — the hexagonal core.
//!
//! [`MeasurementService`] owns the sensor context, the configuration and
//! the diagnostics counters.  It runs exactly one trigger/echo cycle per
//! call and reports the outcome through an [`EventSink`]; scheduling the
//! next cycle is the caller's job.
//!
//! ```text
//!  OutputPin/InputPin ──▶ ┌──────────────────────┐ ──▶ EventSink
//!  MonotonicClock     ──▶ │  MeasurementService  │
//!  DelayNs            ──▶ │  sensor · stats      │
//!                         └──────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::config::MeasurementConfig;
use crate::diagnostics::MeasurementStats;
use crate::error::{Error, Result};
use crate::sensors::ultrasonic::{MeasurementResult, UltrasonicSensor};

use super::events::AppEvent;
use super::ports::{EventSink, MonotonicClock};

/// A stats summary is emitted every this many cycles.
pub const STATS_EVERY_CYCLES: u64 = 60;

// ───────────────────────────────────────────────────────────────
// MeasurementService
// ───────────────────────────────────────────────────────────────

pub struct MeasurementService<T, E, C, D> {
    sensor: UltrasonicSensor<T, E, C, D>,
    config: MeasurementConfig,
    stats: MeasurementStats,
}

impl<T, E, C, D> MeasurementService<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MonotonicClock,
    D: DelayNs,
{
    /// Validate `config` and put the sensor in IDLE (trigger low).
    ///
    /// Either failure is a setup error: no cycle should run.
    pub fn new(mut sensor: UltrasonicSensor<T, E, C, D>, config: MeasurementConfig) -> Result<Self> {
        config.validate()?;
        sensor.idle().map_err(|e| {
            warn!("trigger idle failed: {}", e);
            Error::Setup("trigger line could not be driven low")
        })?;
        Ok(Self {
            sensor,
            config,
            stats: MeasurementStats::new(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!(
            "MeasurementService started (pulse={:?} timeout={:?} interval={:?} c={}cm/us)",
            self.config.pulse_duration(),
            self.config.measurement_timeout(),
            self.config.measurement_interval(),
            self.config.sound_speed_cm_per_us,
        );
        sink.emit(&AppEvent::Started);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one blocking cycle and report it.
    pub fn run_cycle(&mut self, sink: &mut impl EventSink) -> MeasurementResult {
        let result = self.sensor.measure(&self.config);
        self.report(&result, sink);
        result
    }

    /// Run one cycle that yields between echo samples, and report it.
    pub async fn run_cycle_cooperative(&mut self, sink: &mut impl EventSink) -> MeasurementResult {
        let result = self.sensor.measure_cooperative(&self.config).await;
        self.report(&result, sink);
        result
    }

    fn report(&mut self, result: &MeasurementResult, sink: &mut impl EventSink) {
        self.stats.record(result);
        match result {
            Ok(distance_cm) => {
                debug!("cycle {}: {:.2} cm", self.stats.cycles, distance_cm);
                sink.emit(&AppEvent::Reading { distance_cm: *distance_cm });
            }
            Err(e) => {
                debug!("cycle {}: {}", self.stats.cycles, e);
                sink.emit(&AppEvent::MeasurementFailed(*e));
            }
        }
        if self.stats.cycles % STATS_EVERY_CYCLES == 0 {
            sink.emit(&AppEvent::Stats(self.stats));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    pub fn stats(&self) -> MeasurementStats {
        self.stats
    }

    /// Tear down and hand the sensor back.
    pub fn into_sensor(self) -> UltrasonicSensor<T, E, C, D> {
        self.sensor
    }
}
