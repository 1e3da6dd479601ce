// Events consumed by the sender and receiver loops
//
// Both loops are written against `EventSource` so that a device node,
// a socket with a bounded wait, or a scripted test sequence can all drive
// them the same way.

use crate::error::Result;
use crate::input::InputEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The bounded wait elapsed with nothing received
    Timeout,
    /// One record read from the input device
    Input(InputEvent),
    /// One datagram, exactly as received (not yet validated)
    Payload(Vec<u8>),
}

/// Blocking "next event" source. An `Err` is fatal to the consuming loop.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    async fn next_event(&mut self) -> Result<LinkEvent>;
}
