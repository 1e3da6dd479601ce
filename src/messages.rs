// Vehicle intent and its wire format
//
// Payload layout: [steering: i8, wheels: i8]
// No header, version or checksum. Anything that is not exactly
// two bytes long is rejected.

/// Size of an encoded intent on the wire
pub const PAYLOAD_LEN: usize = 2;

/// What the operator wants the vehicle to do
///
/// `steering`: negative = left, positive = right.
/// `wheels`: negative = reverse, positive = forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleIntent {
    pub steering: i8,
    pub wheels: i8,
}

impl VehicleIntent {
    pub fn new(steering: i8, wheels: i8) -> Self {
        Self { steering, wheels }
    }

    /// Centered steering, stopped drive
    pub fn neutral() -> Self {
        Self::default()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Malformed payload: expected {expected} bytes, got {actual}")]
    Size { expected: usize, actual: usize },
}

/// Encode an intent into its fixed two-byte payload
pub fn encode(intent: &VehicleIntent) -> [u8; PAYLOAD_LEN] {
    [intent.steering as u8, intent.wheels as u8]
}

/// Decode a received datagram
pub fn decode(payload: &[u8]) -> Result<VehicleIntent, WireError> {
    match *payload {
        [steering, wheels] => Ok(VehicleIntent {
            steering: steering as i8,
            wheels: wheels as i8,
        }),
        _ => Err(WireError::Size {
            expected: PAYLOAD_LEN,
            actual: payload.len(),
        }),
    }
}
