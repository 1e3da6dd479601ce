// Raspberry Pi hardware PWM backend (rppal)
//
// Wheels on PWM0, steering on PWM1. rppal exports the channel when the
// `Pwm` handle is created, so `export` is where the handle is opened.

use std::collections::HashMap;
use std::time::Duration;

use rppal::pwm::{Channel, Polarity, Pwm};
use tracing::{debug, info};

use super::backend::{PwmBackend, PwmError, Result};
use super::mapping::DutyCycle;
use crate::config::{PWM_NEUTRAL, PWM_PERIOD, STEERING_CHANNEL, WHEELS_CHANNEL};

/// Hardware channel behind a chip index
fn hardware_channel(channel: u32) -> Option<Channel> {
    match channel {
        WHEELS_CHANNEL => Some(Channel::Pwm0),
        STEERING_CHANNEL => Some(Channel::Pwm1),
        _ => None,
    }
}

fn nanos(value: u32) -> Duration {
    Duration::from_nanos(value as u64)
}

#[derive(Default)]
pub struct RppalPwm {
    channels: HashMap<u32, Pwm>,
}

impl RppalPwm {
    pub fn new() -> Self {
        Self::default()
    }

    fn pwm(&self, channel: u32) -> Result<&Pwm> {
        self.channels
            .get(&channel)
            .ok_or(PwmError::UnknownChannel(channel))
    }
}

impl PwmBackend for RppalPwm {
    fn export(&mut self, channel: u32) -> Result<()> {
        if self.channels.contains_key(&channel) {
            debug!("PWM channel {} already open", channel);
            return Ok(());
        }
        let hardware = hardware_channel(channel).ok_or(PwmError::UnknownChannel(channel))?;
        info!("Opening {:?} for channel {}", hardware, channel);
        let pwm = Pwm::with_period(
            hardware,
            nanos(PWM_PERIOD),
            nanos(PWM_NEUTRAL),
            Polarity::Normal,
            false,
        )
        .map_err(|source| PwmError::Rppal { channel, source })?;
        self.channels.insert(channel, pwm);
        Ok(())
    }

    fn set_period(&mut self, channel: u32, period: u32) -> Result<()> {
        debug!("PWM channel {}: period={}", channel, period);
        self.pwm(channel)?
            .set_period(nanos(period))
            .map_err(|source| PwmError::Rppal { channel, source })
    }

    fn enable(&mut self, channel: u32) -> Result<()> {
        debug!("PWM channel {}: enable", channel);
        self.pwm(channel)?
            .enable()
            .map_err(|source| PwmError::Rppal { channel, source })
    }

    fn write_duty_cycle(&mut self, channel: u32, duty: DutyCycle) -> Result<()> {
        self.pwm(channel)?
            .set_pulse_width(nanos(duty.as_u32()))
            .map_err(|source| PwmError::Rppal { channel, source })
    }
}
