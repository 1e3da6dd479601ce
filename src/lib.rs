// Remote-control link between a joystick and a small vehicle
//
// joystick_feed: input device -> InputSampler -> Transmitter -> UDP
// vehicle-link:  UDP -> ReceiverWatchdog -> ActuatorDriver -> PWM

pub mod actuator;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod messages;
pub mod transmitter;
pub mod watchdog;

pub use error::LinkError;
