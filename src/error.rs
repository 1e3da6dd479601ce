use crate::actuator::PwmError;
use crate::messages::WireError;

/// Fatal errors of the control link. Neither loop retries; any of these
/// ends the loop that produced it.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("PWM error: {0}")]
    Pwm(#[from] PwmError),

    #[error("Input device closed")]
    InputClosed,

    #[error("send: no bytes written")]
    EmptySend,
}

pub type Result<T> = std::result::Result<T, LinkError>;
