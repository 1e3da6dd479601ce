// Vehicle side: receive intents, drive the actuators, stop on silence
//
// Every iteration waits at most WATCHDOG_TIMEOUT for a datagram:
//   timeout          -> both channels to neutral (again on every window)
//   valid payload    -> map and apply
//   malformed / IO   -> neutral, then the loop ends with the error
//
// Payloads are applied in arrival order; there is no sequencing, so a
// late or duplicated datagram is applied as if current.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::actuator::{ActuatorDriver, PwmBackend};
use crate::config::WATCHDOG_TIMEOUT;
use crate::error::Result;
use crate::event::{EventSource, LinkEvent};
use crate::messages::decode;

/// Larger than any valid payload so oversized datagrams are detected
/// instead of silently truncated to a valid length.
const RECV_BUF_LEN: usize = 64;

/// Connectionless inbound channel
#[allow(async_fn_in_trait)]
pub trait DatagramSource {
    /// Must be cancel safe: it is raced against the watchdog timeout.
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl DatagramSource for UdpSocket {
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        UdpSocket::recv(self, buf).await
    }
}

/// Bind the control socket
pub async fn bind(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).await?;
    info!("Listening on {}", socket.local_addr()?);
    Ok(socket)
}

/// Turns a datagram source into Timeout / Payload events with a bounded wait
pub struct WatchdogSource<D> {
    inner: D,
    timeout: Duration,
    buf: [u8; RECV_BUF_LEN],
}

impl<D: DatagramSource> WatchdogSource<D> {
    pub fn new(inner: D) -> Self {
        Self::with_timeout(inner, WATCHDOG_TIMEOUT)
    }

    pub fn with_timeout(inner: D, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            buf: [0u8; RECV_BUF_LEN],
        }
    }
}

impl<D: DatagramSource> EventSource for WatchdogSource<D> {
    async fn next_event(&mut self) -> Result<LinkEvent> {
        match timeout(self.timeout, self.inner.recv(&mut self.buf)).await {
            Err(_) => Ok(LinkEvent::Timeout),
            Ok(Ok(len)) => Ok(LinkEvent::Payload(self.buf[..len].to_vec())),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

/// Whether commands are currently arriving. Only used for reporting; the
/// watchdog decides from scratch on every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHealth {
    Ok,
    Stale,
}

pub struct ReceiverWatchdog<E, B: PwmBackend> {
    source: E,
    driver: ActuatorDriver<B>,
    health: LinkHealth,
}

impl<E: EventSource, B: PwmBackend> ReceiverWatchdog<E, B> {
    /// `driver` must already be initialized
    pub fn new(source: E, driver: ActuatorDriver<B>) -> Self {
        Self {
            source,
            driver,
            health: LinkHealth::Stale, // Stale until the first command
        }
    }

    /// Handle exactly one event. Any error is fatal to the loop.
    pub async fn step(&mut self) -> Result<()> {
        match self.source.next_event().await? {
            LinkEvent::Timeout => {
                if self.health == LinkHealth::Ok {
                    warn!("Command stale, stopping vehicle");
                } else {
                    debug!("Still no command, holding neutral");
                }
                self.health = LinkHealth::Stale;
                self.driver.neutral()?;
            }
            LinkEvent::Payload(payload) => {
                let intent = decode(&payload)?;
                if self.health == LinkHealth::Stale {
                    info!("Commands arriving");
                }
                self.health = LinkHealth::Ok;
                self.driver.apply(&intent)?;
            }
            LinkEvent::Input(event) => {
                debug!("Ignoring input event on receiver: {:?}", event);
            }
        }
        Ok(())
    }

    /// Run until a fatal error. The actuators are set to neutral before the
    /// error is returned.
    pub async fn run(&mut self) -> Result<()> {
        info!("Watchdog started: {}ms timeout", WATCHDOG_TIMEOUT.as_millis());
        loop {
            if let Err(e) = self.step().await {
                error!("Control loop failed: {}", e);
                self.fail_safe();
                return Err(e);
            }
        }
    }

    fn fail_safe(&mut self) {
        self.health = LinkHealth::Stale;
        if let Err(e) = self.driver.neutral() {
            warn!("Failed to stop vehicle: {}", e);
        }
    }

    pub fn health(&self) -> LinkHealth {
        self.health
    }

    pub fn driver(&self) -> &ActuatorDriver<B> {
        &self.driver
    }
}

/// Configure the actuators, bind the control port and run the watchdog
pub async fn run_receiver<B: PwmBackend>(addr: SocketAddr, backend: B) -> Result<()> {
    let mut driver = ActuatorDriver::new(backend);
    driver.initialize()?;

    let socket = bind(addr).await?;
    let mut watchdog = ReceiverWatchdog::new(WatchdogSource::new(socket), driver);
    watchdog.run().await
}
