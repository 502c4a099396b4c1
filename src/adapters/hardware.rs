//! Hardware adapter — builds the ultrasonic sensor from real peripherals.
//!
//! This is the only module that touches actual GPIO.  On ESP-IDF it
//! configures the trigger and echo lines through `esp-idf-hal`; on other
//! targets it wires the same sensor to the simulated line in
//! [`crate::sim`], with an echo from a fixed surface distance.

use log::info;

use crate::error::{Error, Result};
use crate::pins;
use crate::sensors::ultrasonic::UltrasonicSensor;

#[cfg(target_os = "espidf")]
mod platform {
    use esp_idf_hal::delay::Ets;
    use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};

    use super::{Error, Result, UltrasonicSensor, info, pins};
    use crate::adapters::time::SystemClock;

    pub type Trigger = PinDriver<'static, AnyOutputPin, Output>;
    pub type Echo = PinDriver<'static, AnyInputPin, Input>;
    pub type Sensor = UltrasonicSensor<Trigger, Echo, SystemClock, Ets>;

    pub fn init_sensor() -> Result<Sensor> {
        // SAFETY: TRIGGER_GPIO and ECHO_GPIO are claimed nowhere else in
        // the firmware; this runs once from main() before the loop.
        let (trigger_pin, echo_pin) = unsafe {
            (AnyOutputPin::new(pins::TRIGGER_GPIO), AnyInputPin::new(pins::ECHO_GPIO))
        };

        let trigger = PinDriver::output(trigger_pin)
            .map_err(|_| Error::Setup("trigger GPIO config failed"))?;
        let echo = PinDriver::input(echo_pin)
            .map_err(|_| Error::Setup("echo GPIO config failed"))?;

        info!("hw: trigger=GPIO{} echo=GPIO{}", pins::TRIGGER_GPIO, pins::ECHO_GPIO);
        Ok(UltrasonicSensor::new(trigger, echo, SystemClock::new(), Ets))
    }
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use super::{Error, Result, UltrasonicSensor, info, pins};
    use crate::sim::{EchoProfile, SimClock, SimEcho, SimTrigger, sim_lines};

    /// Surface distance reported by the simulated tank.
    pub const SIM_SURFACE_CM: f64 = 42.0;

    pub type Sensor = UltrasonicSensor<SimTrigger, SimEcho, SimClock, SimClock>;

    /// Bring up the simulated sensor lines.  The simulated echo width is
    /// derived from the configured sound speed.
    pub fn init_sensor_with(sound_speed_cm_per_us: f64) -> Result<Sensor> {
        if !(sound_speed_cm_per_us.is_finite() && sound_speed_cm_per_us > 0.0) {
            return Err(Error::Setup("simulated line needs a positive sound speed"));
        }
        let clock = SimClock::new();
        let (trigger, echo) = sim_lines(
            &clock,
            EchoProfile::surface(SIM_SURFACE_CM, sound_speed_cm_per_us),
            1,
        );
        info!(
            "hw(sim): trigger=GPIO{} echo=GPIO{} surface={}cm",
            pins::TRIGGER_GPIO,
            pins::ECHO_GPIO,
            SIM_SURFACE_CM
        );
        Ok(UltrasonicSensor::new(trigger, echo, clock.clone(), clock))
    }
}

pub use platform::*;

/// Bring up the sensor lines.  Failure is fatal: the caller must not
/// enter the measurement loop.
#[cfg(target_os = "espidf")]
pub fn setup() -> Result<Sensor> {
    init_sensor().inspect_err(|e| log::error!("hw init failed: {}", e))
}
