//! Integration tests: one trigger/echo cycle against the simulated line.

use tanklevel::app::ports::MonotonicClock;
use tanklevel::config::{MeasurementConfig, PulseStart};
use tanklevel::error::{EdgePhase, MeasureError, SensorLine};
use tanklevel::sensors::ultrasonic::{UltrasonicSensor, measure, round_trip_distance_cm};
use tanklevel::sim::{EchoProfile, SimClock, sim_lines};

use super::mock_hw::FlakyTrigger;

#[test]
fn reference_scenario_582us_is_about_ten_centimetres() {
    let clock = SimClock::new();
    let (mut trigger, mut echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 700, width_us: 582 }, 1);
    let mut delay = clock.clone();

    let d = measure(&mut trigger, &mut echo, &clock, &mut delay, &MeasurementConfig::default()).unwrap();
    assert!((d - 582.0 * 0.0343 / 2.0).abs() < 1e-9);
    assert_eq!(format!("{:.2}", d), "9.98");
}

#[test]
fn zero_width_echo_is_no_pulse_not_zero_distance() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Scripted(vec![false, true, false]), 0);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);

    assert_eq!(sensor.measure(&MeasurementConfig::default()), Err(MeasureError::NoPulse));
}

#[test]
fn silent_line_times_out_after_one_second() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Silent, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock.clone());

    let before = clock.now_us();
    let r = sensor.measure(&MeasurementConfig::default());
    let spent = clock.now_us() - before;

    assert_eq!(r, Err(MeasureError::Timeout(EdgePhase::Rise)));
    assert_eq!(r.unwrap_err().to_string(), "timeout waiting for echo high");
    assert!(spent > 1_000_000, "gave up early after {spent}us");
    assert!(spent < 1_000_100, "overran the budget: {spent}us");
}

#[test]
fn echo_that_never_falls_times_out_on_fall() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::StuckHigh { delay_us: 300 }, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let config = MeasurementConfig { measurement_timeout_us: 50_000, ..Default::default() };

    let r = sensor.measure(&config);
    assert_eq!(r, Err(MeasureError::Timeout(EdgePhase::Fall)));
    assert_eq!(r.unwrap_err().to_string(), "timeout waiting for echo low");
}

#[test]
fn trigger_pulse_has_configured_width() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 10, width_us: 10 }, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);

    sensor.measure(&MeasurementConfig::default()).unwrap();
    sensor.measure(&MeasurementConfig { pulse_duration_us: 25, ..Default::default() }).unwrap();

    let (trigger, ..) = sensor.release();
    assert_eq!(trigger.pulse_widths(), vec![10, 25]);
    assert!(!trigger.is_set_high());
}

#[test]
fn repeated_calls_are_identical() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 321, width_us: 1234 }, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let config = MeasurementConfig::default();

    let first = sensor.measure(&config);
    for _ in 0..5 {
        assert_eq!(sensor.measure(&config), first);
    }
    assert_eq!(first, Ok(round_trip_distance_cm(1234, 0.0343)));
}

#[test]
fn trigger_fault_is_reported_per_cycle() {
    let clock = SimClock::new();
    let (_trigger, mut echo) = sim_lines(&clock, EchoProfile::Silent, 1);
    let mut trigger = FlakyTrigger::failing_after(1);
    let mut delay = clock.clone();

    let r = measure(&mut trigger, &mut echo, &clock, &mut delay, &MeasurementConfig::default());
    assert!(matches!(r, Err(MeasureError::Pin { line: SensorLine::Trigger, .. })));
}

#[test]
fn pulse_start_modes_differ_by_the_rising_sample() {
    let profile = EchoProfile::Pulse { delay_us: 90, width_us: 500 };
    let legacy = MeasurementConfig::default();
    let observed = MeasurementConfig { pulse_start: PulseStart::RiseObserved, ..Default::default() };

    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, profile, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);

    assert_eq!(sensor.measure(&legacy), Ok(round_trip_distance_cm(500, 0.0343)));
    assert_eq!(sensor.measure(&observed), Ok(round_trip_distance_cm(499, 0.0343)));
}

#[test]
fn cooperative_cycle_yields_same_distance() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 40, width_us: 2000 }, 1);
    let mut sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);

    let d = futures_lite::future::block_on(sensor.measure_cooperative(&MeasurementConfig::default()));
    assert_eq!(d, Ok(round_trip_distance_cm(2000, 0.0343)));
}

#[test]
fn echo_falling_after_the_budget_is_a_fall_timeout() {
    for pulse_start in [PulseStart::LastLowSample, PulseStart::RiseObserved] {
        let config = MeasurementConfig { measurement_timeout_us: 100, pulse_start, ..Default::default() };
        let run = |width_us| {
            let clock = SimClock::new();
            let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 0, width_us }, 1);
            UltrasonicSensor::new(trigger, echo, clock.clone(), clock).measure(&config)
        };

        // The fall wait opens one sample after the rise, so a 101 µs echo
        // falls exactly at the budget.
        assert!(run(101).is_ok(), "{pulse_start:?}");
        assert_eq!(run(102), Err(MeasureError::Timeout(EdgePhase::Fall)), "{pulse_start:?}");
    }
}
