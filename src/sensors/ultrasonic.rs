//! HC-SR04 style ultrasonic ranging over a trigger/echo GPIO pair.
//!
//! One measurement is a short state machine:
//!
//! ```text
//!  IDLE ──▶ TRIGGERING ──▶ WAITING_RISE ──▶ WAITING_FALL ──▶ COMPUTED
//!   (trigger low)  (pulse_duration)   │                │         │
//!                                     ▼                ▼         ▼
//!                             Timeout(Rise)    Timeout(Fall)  NoPulse / distance
//! ```
//!
//! Every wait is bounded by `measurement_timeout_us`, measured on the
//! injected [`MonotonicClock`].  Nothing is remembered between calls.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the pins are `esp-idf-hal` `PinDriver`s and the pulse hold
//! is the `Ets` busy-wait.  On host/test the same code runs against the
//! simulated line in [`crate::sim`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::trace;

use crate::app::ports::MonotonicClock;
use crate::config::{MeasurementConfig, PulseStart};
use crate::error::{EdgePhase, MeasureError, SensorLine};

/// Distance in centimetres, or the reason the cycle failed.
pub type MeasurementResult = Result<f64, MeasureError>;

/// Result of sampling the echo line once while waiting for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWaitOutcome {
    /// The edge has not happened yet and the budget is not spent.
    Pending,
    /// The edge was observed.  `at_us` is the timestamp that anchors the
    /// edge, `elapsed_us` the time since the wait began.
    Edge { at_us: u64, elapsed_us: u64 },
    /// The budget ran out before the edge.
    TimedOut,
}

// ───────────────────────────────────────────────────────────────
// Echo state machine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Phase {
    WaitingRise { entered_us: u64, last_low_us: u64 },
    WaitingFall { rise_us: u64, entered_us: u64 },
}

/// Times the echo high phase, one sample per [`step`](Self::step).
///
/// The blocking and the cooperative drivers share this so both behave
/// identically sample-for-sample.
#[derive(Debug)]
pub struct EchoTimer {
    phase: Phase,
    timeout_us: u64,
    pulse_start: PulseStart,
}

impl EchoTimer {
    /// Enter WAITING_RISE now.
    pub fn start(clock: &impl MonotonicClock, config: &MeasurementConfig) -> Self {
        let now = clock.now_us();
        Self {
            phase: Phase::WaitingRise { entered_us: now, last_low_us: now },
            timeout_us: config.measurement_timeout_us,
            pulse_start: config.pulse_start,
        }
    }

    /// Take one echo sample.
    ///
    /// Returns `Ok(Some(high_us))` once the falling edge has been seen,
    /// `Ok(None)` while still waiting, and an error on timeout or pin fault.
    pub fn step<E, C>(&mut self, echo: &mut E, clock: &C) -> Result<Option<u64>, MeasureError>
    where
        E: InputPin,
        C: MonotonicClock,
    {
        match self.phase {
            Phase::WaitingRise { entered_us, last_low_us } => {
                match self.sample_rise(echo, clock, entered_us, last_low_us)? {
                    EdgeWaitOutcome::Pending => Ok(None),
                    EdgeWaitOutcome::TimedOut => Err(MeasureError::Timeout(EdgePhase::Rise)),
                    EdgeWaitOutcome::Edge { at_us, elapsed_us } => {
                        trace!("echo rose {}us into the wait", elapsed_us);
                        self.phase = Phase::WaitingFall { rise_us: at_us, entered_us: clock.now_us() };
                        Ok(None)
                    }
                }
            }
            Phase::WaitingFall { rise_us, entered_us } => {
                match sample_fall(echo, clock, entered_us, self.timeout_us)? {
                    EdgeWaitOutcome::Pending => Ok(None),
                    EdgeWaitOutcome::TimedOut => Err(MeasureError::Timeout(EdgePhase::Fall)),
                    EdgeWaitOutcome::Edge { at_us, elapsed_us } => {
                        let high_us = match self.pulse_start {
                            PulseStart::LastLowSample => at_us.wrapping_sub(rise_us),
                            PulseStart::RiseObserved => elapsed_us,
                        };
                        Ok(Some(high_us))
                    }
                }
            }
        }
    }

    /// Every low sample re-stamps the provisional rise time, so the
    /// window opens at the last low sample before the edge.
    fn sample_rise<E, C>(
        &mut self,
        echo: &mut E,
        clock: &C,
        entered_us: u64,
        last_low_us: u64,
    ) -> Result<EdgeWaitOutcome, MeasureError>
    where
        E: InputPin,
        C: MonotonicClock,
    {
        if echo.is_high().map_err(|e| MeasureError::pin(SensorLine::Echo, &e))? {
            return Ok(EdgeWaitOutcome::Edge {
                at_us: last_low_us,
                elapsed_us: last_low_us.wrapping_sub(entered_us),
            });
        }
        let now = clock.now_us();
        if now.wrapping_sub(entered_us) > self.timeout_us {
            return Ok(EdgeWaitOutcome::TimedOut);
        }
        self.phase = Phase::WaitingRise { entered_us, last_low_us: now };
        Ok(EdgeWaitOutcome::Pending)
    }
}

fn sample_fall<E, C>(
    echo: &mut E,
    clock: &C,
    entered_us: u64,
    timeout_us: u64,
) -> Result<EdgeWaitOutcome, MeasureError>
where
    E: InputPin,
    C: MonotonicClock,
{
    let sampled_at = clock.now_us();
    let low = echo.is_low().map_err(|e| MeasureError::pin(SensorLine::Echo, &e))?;
    let elapsed_us = sampled_at.wrapping_sub(entered_us);
    // A fall sampled past the budget is an overrun, not an edge.
    if elapsed_us > timeout_us {
        return Ok(EdgeWaitOutcome::TimedOut);
    }
    if low {
        return Ok(EdgeWaitOutcome::Edge { at_us: sampled_at, elapsed_us });
    }
    Ok(EdgeWaitOutcome::Pending)
}

// ───────────────────────────────────────────────────────────────
// Measurement
// ───────────────────────────────────────────────────────────────

/// Convert a round-trip echo time to a one-way distance in centimetres.
pub fn round_trip_distance_cm(high_us: u64, sound_speed_cm_per_us: f64) -> f64 {
    high_us as f64 * sound_speed_cm_per_us / 2.0
}

fn emit_pulse<T, D>(trigger: &mut T, delay: &mut D, config: &MeasurementConfig) -> Result<(), MeasureError>
where
    T: OutputPin,
    D: DelayNs,
{
    trigger.set_high().map_err(|e| MeasureError::pin(SensorLine::Trigger, &e))?;
    delay.delay_us(config.pulse_duration_us);
    trigger.set_low().map_err(|e| MeasureError::pin(SensorLine::Trigger, &e))
}

fn finish(high_us: u64, config: &MeasurementConfig) -> MeasurementResult {
    if high_us == 0 {
        return Err(MeasureError::NoPulse);
    }
    Ok(round_trip_distance_cm(high_us, config.sound_speed_cm_per_us))
}

/// Run one full trigger/echo cycle, blocking until a terminal state.
pub fn measure<T, E, C, D>(
    trigger: &mut T,
    echo: &mut E,
    clock: &C,
    delay: &mut D,
    config: &MeasurementConfig,
) -> MeasurementResult
where
    T: OutputPin,
    E: InputPin,
    C: MonotonicClock,
    D: DelayNs,
{
    emit_pulse(trigger, delay, config)?;
    let mut timer = EchoTimer::start(clock, config);
    loop {
        if let Some(high_us) = timer.step(echo, clock)? {
            return finish(high_us, config);
        }
    }
}

/// Same cycle as [`measure`], yielding to the executor after every echo
/// sample so other tasks keep running during the waits.  The trigger
/// pulse itself is still held without yielding.
pub async fn measure_cooperative<T, E, C, D>(
    trigger: &mut T,
    echo: &mut E,
    clock: &C,
    delay: &mut D,
    config: &MeasurementConfig,
) -> MeasurementResult
where
    T: OutputPin,
    E: InputPin,
    C: MonotonicClock,
    D: DelayNs,
{
    emit_pulse(trigger, delay, config)?;
    let mut timer = EchoTimer::start(clock, config);
    loop {
        if let Some(high_us) = timer.step(echo, clock)? {
            return finish(high_us, config);
        }
        futures_lite::future::yield_now().await;
    }
}

// ───────────────────────────────────────────────────────────────
// Owned sensor context
// ───────────────────────────────────────────────────────────────

/// A trigger/echo pair plus its time sources, owned by the caller for
/// the life of the process.
pub struct UltrasonicSensor<T, E, C, D> {
    trigger: T,
    echo: E,
    clock: C,
    delay: D,
}

impl<T, E, C, D> UltrasonicSensor<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MonotonicClock,
    D: DelayNs,
{
    pub fn new(trigger: T, echo: E, clock: C, delay: D) -> Self {
        Self { trigger, echo, clock, delay }
    }

    /// Drive the trigger low so the sensor starts from IDLE.
    pub fn idle(&mut self) -> Result<(), MeasureError> {
        self.trigger.set_low().map_err(|e| MeasureError::pin(SensorLine::Trigger, &e))
    }

    pub fn measure(&mut self, config: &MeasurementConfig) -> MeasurementResult {
        measure(&mut self.trigger, &mut self.echo, &self.clock, &mut self.delay, config)
    }

    pub async fn measure_cooperative(&mut self, config: &MeasurementConfig) -> MeasurementResult {
        measure_cooperative(&mut self.trigger, &mut self.echo, &self.clock, &mut self.delay, config).await
    }

    /// Hand the pins back.
    pub fn release(self) -> (T, E, C, D) {
        (self.trigger, self.echo, self.clock, self.delay)
    }
}
