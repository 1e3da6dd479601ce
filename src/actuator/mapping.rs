// Intent -> PWM duty cycle
//
// duty = NEUTRAL + (MAX - MIN) / 2 * value / 127
//
// Integer arithmetic, multiplication before division, truncation toward
// zero. The result is clamped to [MIN, MAX] so that a wire value of -128
// cannot push a channel past its limit.

use crate::config::{PWM_MAX, PWM_MIN, PWM_NEUTRAL, STEERING_CHANNEL, WHEELS_CHANNEL};
use crate::messages::VehicleIntent;

const HALF_SPAN: i64 = (PWM_MAX as i64 - PWM_MIN as i64) / 2;
const FULL_SCALE: i64 = 127;

/// Duty cycle in PWM time units (nanoseconds of high time per period)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DutyCycle(pub u32);

impl DutyCycle {
    pub const MIN: DutyCycle = DutyCycle(PWM_MIN);
    pub const NEUTRAL: DutyCycle = DutyCycle(PWM_NEUTRAL);
    pub const MAX: DutyCycle = DutyCycle(PWM_MAX);

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two actuator outputs of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Wheels,
    Steering,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Wheels, Channel::Steering];

    /// Index on the PWM chip
    pub fn index(self) -> u32 {
        match self {
            Channel::Wheels => WHEELS_CHANNEL,
            Channel::Steering => STEERING_CHANNEL,
        }
    }
}

/// Map one intent field to a duty cycle
pub fn duty_for(value: i8) -> DutyCycle {
    let duty = PWM_NEUTRAL as i64 + HALF_SPAN * value as i64 / FULL_SCALE;
    DutyCycle(duty.clamp(PWM_MIN as i64, PWM_MAX as i64) as u32)
}

/// Duty cycles for both channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyPair {
    pub steering: DutyCycle,
    pub wheels: DutyCycle,
}

impl DutyPair {
    pub fn neutral() -> Self {
        Self {
            steering: DutyCycle::NEUTRAL,
            wheels: DutyCycle::NEUTRAL,
        }
    }
}

impl From<&VehicleIntent> for DutyPair {
    fn from(intent: &VehicleIntent) -> Self {
        Self {
            steering: duty_for(intent.steering),
            wheels: duty_for(intent.wheels),
        }
    }
}
