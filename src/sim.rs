//! Host-side simulation of the sensor lines.
//!
//! A virtual microsecond clock plus a trigger and echo pin that talk to
//! each other through it: the trigger's falling edge fires the simulated
//! sensor, and the echo answers according to an [`EchoProfile`] measured
//! from that moment.  Time only moves when something consumes it:
//!
//! - `DelayNs` on [`SimClock`] advances by the requested delay;
//! - every echo sample advances by the line's `tick_us` after it is read.
//!
//! Reading the clock is free, so runs are fully deterministic.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::app::ports::MonotonicClock;

// ── Clock ─────────────────────────────────────────────────────

/// Shared virtual clock.  Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_us: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&self, us: u64) {
        self.now_us.set(self.now_us.get().wrapping_add(us));
    }
}

impl MonotonicClock for SimClock {
    fn now_us(&self) -> u64 {
        self.now_us.get()
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_us(u64::from(ns.div_ceil(1000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_us(u64::from(us));
    }
}

// ── Errors ────────────────────────────────────────────────────

/// Error returned by a simulated line configured to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl digital::Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

// ── Echo behaviour ────────────────────────────────────────────

/// How the simulated sensor answers a trigger pulse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoProfile {
    /// Never answers: the echo stays low.
    Silent,
    /// Goes high `delay_us` after the trigger and never comes back.
    StuckHigh { delay_us: u64 },
    /// Goes high `delay_us` after the trigger for `width_us`.
    Pulse { delay_us: u64, width_us: u64 },
    /// Explicit per-sample levels after each trigger; the last one repeats.
    Scripted(Vec<bool>),
    /// Every read fails.
    Faulty,
}

impl EchoProfile {
    /// A clean echo from a surface `distance_cm` away.
    pub fn surface(distance_cm: f64, sound_speed_cm_per_us: f64) -> Self {
        let width_us = (2.0 * distance_cm / sound_speed_cm_per_us).round() as u64;
        Self::Pulse { delay_us: 450, width_us }
    }
}

#[derive(Debug, Default)]
struct SensorState {
    fired_at: Option<u64>,
    fire_count: u64,
    pulse_widths: Vec<u64>,
}

// ── Trigger ───────────────────────────────────────────────────

/// Simulated trigger output.  A high→low transition fires the sensor.
pub struct SimTrigger {
    clock: SimClock,
    state: Rc<RefCell<SensorState>>,
    high_since: Option<u64>,
}

impl SimTrigger {
    /// Widths (µs) of every pulse emitted so far.
    pub fn pulse_widths(&self) -> Vec<u64> {
        self.state.borrow().pulse_widths.clone()
    }

    pub fn is_set_high(&self) -> bool {
        self.high_since.is_some()
    }
}

impl ErrorType for SimTrigger {
    type Error = SimPinError;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if let Some(since) = self.high_since.take() {
            let now = self.clock.now_us();
            let mut state = self.state.borrow_mut();
            state.pulse_widths.push(now.wrapping_sub(since));
            state.fired_at = Some(now);
            state.fire_count += 1;
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.high_since.is_none() {
            self.high_since = Some(self.clock.now_us());
        }
        Ok(())
    }
}

// ── Echo ──────────────────────────────────────────────────────

/// Simulated echo input.
pub struct SimEcho {
    clock: SimClock,
    state: Rc<RefCell<SensorState>>,
    profile: EchoProfile,
    tick_us: u64,
    script_fire: u64,
    script_pos: usize,
}

impl SimEcho {
    fn sample(&mut self) -> Result<bool, SimPinError> {
        let now = self.clock.now_us();
        let (fired_at, fire_count) = {
            let state = self.state.borrow();
            (state.fired_at, state.fire_count)
        };
        let level = match (&self.profile, fired_at) {
            (EchoProfile::Faulty, _) => return Err(SimPinError),
            (_, None) | (EchoProfile::Silent, _) => false,
            (EchoProfile::StuckHigh { delay_us }, Some(at)) => now.wrapping_sub(at) >= *delay_us,
            (EchoProfile::Pulse { delay_us, width_us }, Some(at)) => {
                let rel = now.wrapping_sub(at);
                rel >= *delay_us && rel < delay_us + width_us
            }
            (EchoProfile::Scripted(levels), Some(_)) => {
                if self.script_fire != fire_count {
                    self.script_fire = fire_count;
                    self.script_pos = 0;
                }
                let level = levels
                    .get(self.script_pos)
                    .or(levels.last())
                    .copied()
                    .unwrap_or(false);
                self.script_pos += 1;
                level
            }
        };
        self.clock.advance_us(self.tick_us);
        Ok(level)
    }
}

impl ErrorType for SimEcho {
    type Error = SimPinError;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.sample()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.sample().map(|high| !high)
    }
}

/// Build a connected trigger/echo pair on `clock`.  Each echo read costs
/// `tick_us` of virtual time.
pub fn sim_lines(clock: &SimClock, profile: EchoProfile, tick_us: u64) -> (SimTrigger, SimEcho) {
    let state = Rc::new(RefCell::new(SensorState::default()));
    let trigger = SimTrigger {
        clock: clock.clone(),
        state: Rc::clone(&state),
        high_since: None,
    };
    let echo = SimEcho {
        clock: clock.clone(),
        state,
        profile,
        tick_us,
        script_fire: 0,
        script_pos: 0,
    };
    (trigger, echo)
}
