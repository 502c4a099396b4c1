//! Integration tests: MeasurementService → sensor → event sink.

use tanklevel::app::events::AppEvent;
use tanklevel::app::service::{MeasurementService, STATS_EVERY_CYCLES};
use tanklevel::config::MeasurementConfig;
use tanklevel::error::{EdgePhase, Error, MeasureError};
use tanklevel::sensors::ultrasonic::UltrasonicSensor;
use tanklevel::sim::{EchoProfile, SimClock, sim_lines};

use super::mock_hw::{FlakyTrigger, RecordingSink};

#[test]
fn readings_print_in_console_format() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 500, width_us: 582 }, 1);
    let sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let mut svc = MeasurementService::new(sensor, MeasurementConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    svc.start(&mut sink);
    for _ in 0..3 {
        svc.run_cycle(&mut sink).unwrap();
    }

    assert_eq!(sink.events.first(), Some(&AppEvent::Started));
    assert_eq!(sink.lines(), vec!["Distance to water surface: 9.98 cm"; 3]);
}

#[test]
fn failures_print_error_lines_and_loop_continues() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Silent, 1);
    let sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let config = MeasurementConfig { measurement_timeout_us: 1_000, ..Default::default() };
    let mut svc = MeasurementService::new(sensor, config).unwrap();
    let mut sink = RecordingSink::new();

    for _ in 0..2 {
        assert_eq!(
            svc.run_cycle(&mut sink),
            Err(MeasureError::Timeout(EdgePhase::Rise))
        );
    }

    assert_eq!(
        sink.lines(),
        vec!["Error measuring distance: timeout waiting for echo high"; 2]
    );
    assert_eq!(svc.stats().cycles, 2);
    assert_eq!(svc.stats().failures(), 2);
}

#[test]
fn trigger_that_cannot_idle_is_a_setup_failure() {
    let clock = SimClock::new();
    let (_trigger, echo) = sim_lines(&clock, EchoProfile::Silent, 1);
    let sensor = UltrasonicSensor::new(FlakyTrigger::failing_after(0), echo, clock.clone(), clock);

    let r = MeasurementService::new(sensor, MeasurementConfig::default());
    assert!(matches!(r, Err(Error::Setup(_))));
}

#[test]
fn stats_event_carries_counters() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Pulse { delay_us: 5, width_us: 50 }, 1);
    let sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let mut svc = MeasurementService::new(sensor, MeasurementConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    for _ in 0..STATS_EVERY_CYCLES * 2 {
        svc.run_cycle(&mut sink).unwrap();
    }

    let stats: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Stats(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].successes, STATS_EVERY_CYCLES);
    assert_eq!(stats[1].cycles, STATS_EVERY_CYCLES * 2);
}

#[test]
fn cooperative_cycle_reports_like_blocking() {
    let clock = SimClock::new();
    let (trigger, echo) = sim_lines(&clock, EchoProfile::Scripted(vec![false, true, false]), 0);
    let sensor = UltrasonicSensor::new(trigger, echo, clock.clone(), clock);
    let mut svc = MeasurementService::new(sensor, MeasurementConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    let r = futures_lite::future::block_on(svc.run_cycle_cooperative(&mut sink));
    assert_eq!(r, Err(MeasureError::NoPulse));
    assert_eq!(sink.lines(), vec!["Error measuring distance: no pulse detected"]);
}
