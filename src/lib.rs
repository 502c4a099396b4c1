//! TankLevel firmware library.
//!
//! Measures the distance to a liquid surface with an ultrasonic
//! trigger/echo sensor.  Exposes the pure-logic modules for integration
//! testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod sensors;

#[cfg(not(target_os = "espidf"))]
pub mod sim;
