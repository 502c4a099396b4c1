//! GPIO pin assignments for the sensor board.
//!
//! Single source of truth — the hardware adapter references this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Ultrasonic transducer (HC-SR04 / JSN-SR04T)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a ranging cycle.
pub const TRIGGER_GPIO: i32 = 4;
/// Digital input: HIGH for the round-trip time of the ping.
/// Sensor runs at 5 V; the echo goes through a 1k/2k divider to 3.3 V.
pub const ECHO_GPIO: i32 = 5;
