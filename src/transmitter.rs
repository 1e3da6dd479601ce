// Joystick feed: sample input, send the current intent at most 30 times a second
//
// The rate check runs once per input record, so the joystick's periodic
// sync events keep this loop sending even when no axis moves. If the
// device goes quiet nothing is sent, and the vehicle's watchdog stops it.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::SEND_INTERVAL;
use crate::error::{LinkError, Result};
use crate::event::{EventSource, LinkEvent};
use crate::input::InputSampler;
use crate::messages::{encode, VehicleIntent};

/// Lets a send through when at least `interval` has passed since the last one.
/// Missed slots are not replayed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    pub fn ready(&self, now: Instant) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(SEND_INTERVAL)
    }
}

/// Connectionless outbound channel
#[allow(async_fn_in_trait)]
pub trait DatagramSink {
    async fn send(&mut self, payload: &[u8]) -> io::Result<usize>;
}

impl DatagramSink for UdpSocket {
    async fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        UdpSocket::send(self, payload).await
    }
}

/// Open a UDP socket connected to the vehicle
pub async fn connect(target: SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(target).await?;
    info!("Sending to {}", target);
    Ok(socket)
}

pub struct Transmitter<S> {
    sink: S,
    limiter: RateLimiter,
}

impl<S: DatagramSink> Transmitter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_limiter(sink, RateLimiter::default())
    }

    pub fn with_limiter(sink: S, limiter: RateLimiter) -> Self {
        Self { sink, limiter }
    }

    /// Send `intent` if the rate limit allows it. Returns whether a datagram
    /// went out. Send failures are fatal.
    pub async fn tick(&mut self, intent: VehicleIntent, now: Instant) -> Result<bool> {
        if !self.limiter.ready(now) {
            return Ok(false);
        }

        let payload = encode(&intent);
        let sent = self.sink.send(&payload).await?;
        if sent == 0 {
            return Err(LinkError::EmptySend);
        }
        self.limiter.mark_sent(now);
        debug!("Sent steering={} wheels={}", intent.steering, intent.wheels);
        Ok(true)
    }
}

/// Sender loop. Only returns on a fatal error.
pub async fn run_sender<E, S>(source: &mut E, sink: S) -> Result<()>
where
    E: EventSource,
    S: DatagramSink,
{
    let mut sampler = InputSampler::new();
    let mut transmitter = Transmitter::new(sink);

    info!(
        "Joystick feed started: max {}ms between sends",
        SEND_INTERVAL.as_millis()
    );

    loop {
        if let LinkEvent::Input(event) = source.next_event().await? {
            sampler.apply(&event);
        }
        transmitter.tick(sampler.snapshot(), Instant::now()).await?;
    }
}
