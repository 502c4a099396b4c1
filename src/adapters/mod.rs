//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                     |
//! |------------|---------------------|---------------------------------|
//! | `console`  | EventSink           | stdout report lines + log       |
//! | `hardware` | OutputPin/InputPin  | ESP32 GPIO, or the sim line     |
//! | `time`     | MonotonicClock      | ESP32 system timer / `Instant`  |

pub mod console;
pub mod hardware;
pub mod time;
