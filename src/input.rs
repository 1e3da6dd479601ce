// Joystick input: raw Linux input events -> current VehicleIntent
//
// Axis calibration (raw 0..=255 on every axis):
//   steering  0 (L) / 127 (C) / 255 (R)  ->  -127 / 0 / 127
//   reverse   0..=255                    ->  0..=-127
//   forward   0..=255                    ->  0..=127

use std::ffi::c_long;
use std::io::ErrorKind;
use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::{ABS_FORWARD, ABS_REVERSE, ABS_STEERING, EV_ABS};
use crate::error::{LinkError, Result};
use crate::event::{EventSource, LinkEvent};
use crate::messages::VehicleIntent;

/// Kernel `struct input_event`: timeval (two C longs), type, code, value
const TIMESTAMP_LEN: usize = 2 * std::mem::size_of::<c_long>();
pub const INPUT_EVENT_LEN: usize = TIMESTAMP_LEN + 8;

/// Largest magnitude either intent field may carry
const AXIS_LIMIT: i64 = 127;
const RAW_AXIS_MAX: i64 = 255;

/// One record from the input device (timestamp dropped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Shorthand for an absolute-axis event
    pub fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    /// Decode a raw record in native byte order
    pub fn from_raw(raw: &[u8; INPUT_EVENT_LEN]) -> Self {
        let t = TIMESTAMP_LEN;
        Self {
            kind: u16::from_ne_bytes([raw[t], raw[t + 1]]),
            code: u16::from_ne_bytes([raw[t + 2], raw[t + 3]]),
            value: i32::from_ne_bytes([raw[t + 4], raw[t + 5], raw[t + 6], raw[t + 7]]),
        }
    }

    /// Inverse of `from_raw`, with a zero timestamp
    #[cfg(test)]
    fn to_raw(&self) -> [u8; INPUT_EVENT_LEN] {
        let t = TIMESTAMP_LEN;
        let mut raw = [0u8; INPUT_EVENT_LEN];
        raw[t..t + 2].copy_from_slice(&self.kind.to_ne_bytes());
        raw[t + 2..t + 4].copy_from_slice(&self.code.to_ne_bytes());
        raw[t + 4..t + 8].copy_from_slice(&self.value.to_ne_bytes());
        raw
    }
}

/// Joystick axes that drive the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Steering,
    Reverse,
    Forward,
}

impl Axis {
    /// Recognize an event; anything that is not one of our absolute axes is `None`
    pub fn from_event(event: &InputEvent) -> Option<Self> {
        if event.kind != EV_ABS {
            return None;
        }
        match event.code {
            ABS_STEERING => Some(Axis::Steering),
            ABS_REVERSE => Some(Axis::Reverse),
            ABS_FORWARD => Some(Axis::Forward),
            _ => None,
        }
    }
}

/// Raw stick value to steering. Raw 255 would give 128, which does not fit
/// the signed byte on the wire, so the result is clamped to +/-127.
pub fn steering_from_raw(raw: i32) -> i8 {
    clamp_axis(i64::from(raw) - 127)
}

/// Raw trigger value to reverse drive (truncates toward zero)
pub fn reverse_from_raw(raw: i32) -> i8 {
    clamp_axis(-AXIS_LIMIT * i64::from(raw) / RAW_AXIS_MAX)
}

/// Raw trigger value to forward drive (truncates toward zero)
pub fn forward_from_raw(raw: i32) -> i8 {
    clamp_axis(AXIS_LIMIT * i64::from(raw) / RAW_AXIS_MAX)
}

fn clamp_axis(value: i64) -> i8 {
    value.clamp(-AXIS_LIMIT, AXIS_LIMIT) as i8
}

/// Holds the single current intent. Every recognized event overwrites its
/// field; reverse and forward share `wheels`, so the last one wins.
#[derive(Debug, Default)]
pub struct InputSampler {
    intent: VehicleIntent,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns the axis it updated, if any.
    pub fn apply(&mut self, event: &InputEvent) -> Option<Axis> {
        let axis = Axis::from_event(event)?;
        match axis {
            Axis::Steering => self.intent.steering = steering_from_raw(event.value),
            Axis::Reverse => self.intent.wheels = reverse_from_raw(event.value),
            Axis::Forward => self.intent.wheels = forward_from_raw(event.value),
        }
        Some(axis)
    }

    /// Current intent (non-destructive)
    pub fn snapshot(&self) -> VehicleIntent {
        self.intent
    }
}

/// Input device node (e.g. /dev/input/event0) read one record at a time
pub struct EventDevice {
    file: File,
}

impl EventDevice {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening input device {}", path.display());
        let file = File::open(path).await?;
        Ok(Self { file })
    }

    /// Read the next record. A short read means the device went away.
    pub async fn read_event(&mut self) -> Result<InputEvent> {
        let mut raw = [0u8; INPUT_EVENT_LEN];
        self.file.read_exact(&mut raw).await.map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                LinkError::InputClosed
            } else {
                LinkError::Io(e)
            }
        })?;
        let event = InputEvent::from_raw(&raw);
        debug!("Input event: type={} code={} value={}", event.kind, event.code, event.value);
        Ok(event)
    }
}

impl EventSource for EventDevice {
    async fn next_event(&mut self) -> Result<LinkEvent> {
        self.read_event().await.map(LinkEvent::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steering_calibration() {
        assert_eq!(steering_from_raw(0), -127);
        assert_eq!(steering_from_raw(127), 0);
        assert_eq!(steering_from_raw(254), 127);
        // 255 - 127 = 128 does not fit, stays at full right lock
        assert_eq!(steering_from_raw(255), 127);
    }

    #[test]
    fn test_trigger_ranges() {
        for raw in 0..=255 {
            let r = reverse_from_raw(raw);
            let f = forward_from_raw(raw);
            assert!((-127..=0).contains(&r), "reverse({}) = {}", raw, r);
            assert!((0..=127).contains(&f), "forward({}) = {}", raw, f);
            assert_eq!(r as i32, -127 * raw / 255);
            assert_eq!(f as i32, 127 * raw / 255);
        }
        assert_eq!(reverse_from_raw(255), -127);
        assert_eq!(forward_from_raw(255), 127);
        // 127 * 128 / 255 = 63.75 -> 63
        assert_eq!(forward_from_raw(128), 63);
        assert_eq!(reverse_from_raw(128), -63);
        // Out-of-range device values saturate instead of overflowing
        assert_eq!(steering_from_raw(i32::MIN), -127);
        assert_eq!(forward_from_raw(i32::MAX), 127);
    }

    #[test]
    fn test_last_trigger_wins() {
        let mut sampler = InputSampler::new();
        sampler.apply(&InputEvent::abs(ABS_FORWARD, 255));
        sampler.apply(&InputEvent::abs(ABS_REVERSE, 255));
        assert_eq!(sampler.snapshot().wheels, -127);
        sampler.apply(&InputEvent::abs(ABS_FORWARD, 0));
        assert_eq!(sampler.snapshot().wheels, 0);
    }

    #[test]
    fn test_unrecognized_events_ignored() {
        let mut sampler = InputSampler::new();
        sampler.apply(&InputEvent::abs(ABS_STEERING, 200));
        let before = sampler.snapshot();

        // sync event, key event, unmapped axis
        assert_eq!(sampler.apply(&InputEvent::new(0, 0, 0)), None);
        assert_eq!(sampler.apply(&InputEvent::new(1, ABS_STEERING, 1)), None);
        assert_eq!(sampler.apply(&InputEvent::abs(1, 42)), None);
        assert_eq!(sampler.snapshot(), before);
        assert_eq!(before, VehicleIntent::new(73, 0));
    }

    #[test]
    fn test_raw_record_layout() {
        let event = InputEvent::abs(ABS_REVERSE, 200);
        let raw = event.to_raw();
        assert_eq!(raw.len(), INPUT_EVENT_LEN);
        assert!(raw[..TIMESTAMP_LEN].iter().all(|&b| b == 0));
        assert_eq!(InputEvent::from_raw(&raw), event);
    }

    #[tokio::test]
    async fn test_device_short_read_is_fatal() {
        let path = std::env::temp_dir().join(format!("vehicle-link-input-{}", std::process::id()));
        let mut bytes = InputEvent::abs(ABS_STEERING, 0).to_raw().to_vec();
        bytes.extend_from_slice(&[0u8; 3]); // truncated second record
        std::fs::write(&path, &bytes).unwrap();

        let mut device = EventDevice::open(&path).await.unwrap();
        assert_eq!(
            device.next_event().await.unwrap(),
            LinkEvent::Input(InputEvent::abs(ABS_STEERING, 0))
        );
        assert!(matches!(
            device.next_event().await,
            Err(LinkError::InputClosed)
        ));

        std::fs::remove_file(&path).unwrap();
    }
}
