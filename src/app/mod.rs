//! Application core — measurement orchestration, zero direct I/O.
//!
//! All interaction with hardware happens through `embedded-hal` traits and
//! the **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
