// High-level actuator driver for the vehicle
//
// Owns the PWM backend and the two channels (wheels, steering). Nothing
// else writes to a channel.

use tracing::{debug, info, warn};

use super::backend::{PwmBackend, Result};
use super::mapping::{Channel, DutyCycle, DutyPair};
use crate::config::PWM_PERIOD;
use crate::messages::VehicleIntent;

pub struct ActuatorDriver<B: PwmBackend> {
    backend: B,
}

impl<B: PwmBackend> ActuatorDriver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Configure both channels for control
    ///
    /// Per channel: export (if needed), set the 20 Hz period, park at
    /// neutral, enable. Must be called once before the control loop.
    pub fn initialize(&mut self) -> Result<()> {
        for channel in Channel::ALL {
            let index = channel.index();
            info!("Initializing {:?} on PWM channel {}", channel, index);
            self.backend.export(index)?;
            self.backend.set_period(index, PWM_PERIOD)?;
            self.backend.write_duty_cycle(index, DutyCycle::NEUTRAL)?;
            self.backend.enable(index)?;
        }
        info!("Actuators initialized at neutral");
        Ok(())
    }

    pub fn set_duty_cycle(&mut self, channel: Channel, duty: DutyCycle) -> Result<()> {
        self.backend.write_duty_cycle(channel.index(), duty)
    }

    /// Write both channels, steering first
    pub fn set_duty_pair(&mut self, pair: DutyPair) -> Result<()> {
        self.set_duty_cycle(Channel::Steering, pair.steering)?;
        self.set_duty_cycle(Channel::Wheels, pair.wheels)
    }

    /// Map an intent to duty cycles and apply it
    pub fn apply(&mut self, intent: &VehicleIntent) -> Result<()> {
        let pair = DutyPair::from(intent);
        debug!(
            "Applying steering={} ({}) wheels={} ({})",
            intent.steering, pair.steering, intent.wheels, pair.wheels
        );
        self.set_duty_pair(pair)
    }

    /// Centered steering, stopped drive
    pub fn neutral(&mut self) -> Result<()> {
        self.set_duty_pair(DutyPair::neutral())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: PwmBackend> Drop for ActuatorDriver<B> {
    fn drop(&mut self) {
        // Leave the vehicle parked however the driver goes away
        if let Err(e) = self.neutral() {
            warn!("Failed to set neutral on drop: {}", e);
        }
    }
}
