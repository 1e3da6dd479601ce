// In-memory PWM backend for running without hardware
//
// Logs every duty-cycle write and keeps a timestamped history of them.

use std::collections::{BTreeMap, BTreeSet};

use tokio::time::Instant;
use tracing::info;

use super::backend::{PwmBackend, PwmError, Result};
use super::mapping::DutyCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyWrite {
    pub channel: u32,
    pub duty: DutyCycle,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct SimulatedPwm {
    exported: BTreeSet<u32>,
    enabled: BTreeSet<u32>,
    periods: BTreeMap<u32, u32>,
    writes: Vec<DutyWrite>,
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, channel: u32) -> Result<()> {
        if self.exported.contains(&channel) {
            Ok(())
        } else {
            Err(PwmError::UnknownChannel(channel))
        }
    }

    /// Every duty-cycle write so far, oldest first
    pub fn writes(&self) -> &[DutyWrite] {
        &self.writes
    }

    pub fn writes_to(&self, channel: u32) -> impl Iterator<Item = &DutyWrite> {
        self.writes.iter().filter(move |w| w.channel == channel)
    }

    pub fn last_duty(&self, channel: u32) -> Option<DutyCycle> {
        self.writes_to(channel).last().map(|w| w.duty)
    }

    pub fn is_enabled(&self, channel: u32) -> bool {
        self.enabled.contains(&channel)
    }

    pub fn period(&self, channel: u32) -> Option<u32> {
        self.periods.get(&channel).copied()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl PwmBackend for SimulatedPwm {
    fn export(&mut self, channel: u32) -> Result<()> {
        self.exported.insert(channel);
        Ok(())
    }

    fn set_period(&mut self, channel: u32, period: u32) -> Result<()> {
        self.check(channel)?;
        self.periods.insert(channel, period);
        Ok(())
    }

    fn enable(&mut self, channel: u32) -> Result<()> {
        self.check(channel)?;
        self.enabled.insert(channel);
        Ok(())
    }

    fn write_duty_cycle(&mut self, channel: u32, duty: DutyCycle) -> Result<()> {
        self.check(channel)?;
        info!("[sim] pwm{} duty_cycle={}", channel, duty);
        self.writes.push(DutyWrite {
            channel,
            duty,
            at: Instant::now(),
        });
        Ok(())
    }
}
