//! TankLevel Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                     │
//! │                                                            │
//! │  hardware (GPIO / sim)   SystemClock    ConsoleSink        │
//! │  OutputPin + InputPin    MonotonicClock EventSink          │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ────────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │   MeasurementService (one trigger/echo cycle)    │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  Fixed-interval loop: the only retry mechanism             │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use tanklevel::adapters::console::ConsoleSink;
use tanklevel::adapters::hardware;
use tanklevel::app::service::MeasurementService;
use tanklevel::config::MeasurementConfig;

// ── Bootstrap helpers ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

/// No filesystem on the board: compiled-in defaults.
#[cfg(target_os = "espidf")]
fn load_config() -> Result<MeasurementConfig> {
    Ok(MeasurementConfig::default())
}

/// Optional first argument: path to a JSON file overriding any subset of
/// the defaults.
#[cfg(not(target_os = "espidf"))]
fn load_config() -> Result<MeasurementConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("No config file given, using defaults");
        return Ok(MeasurementConfig::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config = MeasurementConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;
    info!("TankLevel v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config ─────────────────────────────────────────────
    let config = load_config()?;

    // ── 3. Hardware: fatal on failure, before any cycle ───────
    #[cfg(target_os = "espidf")]
    let sensor = hardware::setup();
    #[cfg(not(target_os = "espidf"))]
    let sensor = hardware::init_sensor_with(config.sound_speed_cm_per_us);
    let sensor = sensor.context("sensor setup failed")?;
    let mut service = MeasurementService::new(sensor, config).context("measurement service setup failed")?;

    let mut sink = ConsoleSink::new();
    service.start(&mut sink);

    // ── 4. Sampling loop ──────────────────────────────────────
    let interval = service.config().measurement_interval();
    loop {
        // Failures already went to the sink; the next tick is the retry.
        let _ = service.run_cycle(&mut sink);
        std::thread::sleep(interval);
    }
}
