// What the driver needs from a PWM implementation

use std::io;
use std::path::PathBuf;

use super::mapping::DutyCycle;

#[derive(Debug, thiserror::Error)]
pub enum PwmError {
    #[error("Can't write on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PWM channel {0} is not exported")]
    UnknownChannel(u32),

    #[cfg(feature = "real-actuators")]
    #[error("PWM channel {channel}: {source}")]
    Rppal {
        channel: u32,
        #[source]
        source: rppal::pwm::Error,
    },
}

pub type Result<T> = std::result::Result<T, PwmError>;

/// PWM capability: channel setup plus the per-message duty-cycle write.
///
/// `export`, `set_period` and `enable` run once before the control loop;
/// only `write_duty_cycle` is used per message.
pub trait PwmBackend {
    /// Make the channel available. Must be a no-op if it already is.
    fn export(&mut self, channel: u32) -> Result<()>;

    fn set_period(&mut self, channel: u32, period: u32) -> Result<()>;

    fn enable(&mut self, channel: u32) -> Result<()>;

    fn write_duty_cycle(&mut self, channel: u32, duty: DutyCycle) -> Result<()>;
}
