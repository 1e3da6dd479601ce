// Actuator control for the vehicle
//
// Provides:
// - Intent -> duty cycle mapping
// - PWM backend capability trait
// - Raspberry Pi (rppal), generic sysfs and simulated backends
// - High-level driver API

mod backend;
mod driver;
pub mod mapping;
#[cfg(feature = "real-actuators")]
pub mod rpi;
pub mod simulated;
pub mod sysfs;

pub use backend::{PwmBackend, PwmError};
pub use driver::ActuatorDriver;
pub use mapping::{duty_for, Channel, DutyCycle, DutyPair};
#[cfg(feature = "real-actuators")]
pub use rpi::RppalPwm;
pub use simulated::{DutyWrite, SimulatedPwm};
pub use sysfs::SysfsPwm;
