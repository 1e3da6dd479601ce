// Sender and receiver talking over real loopback UDP, simulated PWM

use std::time::Duration;

use tokio::net::UdpSocket;
use vehicle_link::actuator::{ActuatorDriver, DutyCycle, SimulatedPwm};
use vehicle_link::config::{ABS_FORWARD, ABS_STEERING, STEERING_CHANNEL, WHEELS_CHANNEL};
use vehicle_link::event::{EventSource, LinkEvent};
use vehicle_link::input::InputEvent;
use vehicle_link::transmitter::{connect, run_sender};
use vehicle_link::watchdog::{bind, LinkHealth, ReceiverWatchdog, WatchdogSource};
use vehicle_link::LinkError;

/// Yields the given input events, then reports the device as closed
struct Joystick(Vec<InputEvent>);

impl EventSource for Joystick {
    async fn next_event(&mut self) -> Result<LinkEvent, LinkError> {
        if self.0.is_empty() {
            return Err(LinkError::InputClosed);
        }
        Ok(LinkEvent::Input(self.0.remove(0)))
    }
}

async fn vehicle() -> (
    ReceiverWatchdog<WatchdogSource<UdpSocket>, SimulatedPwm>,
    std::net::SocketAddr,
) {
    let socket = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = socket.local_addr().unwrap();

    let mut driver = ActuatorDriver::new(SimulatedPwm::new());
    driver.initialize().unwrap();

    let source = WatchdogSource::with_timeout(socket, Duration::from_millis(100));
    (ReceiverWatchdog::new(source, driver), addr)
}

#[tokio::test]
async fn test_joystick_drives_vehicle() {
    let (mut watchdog, addr) = vehicle().await;

    let sink = connect(addr).await.unwrap();
    let mut joystick = Joystick(vec![InputEvent::abs(ABS_STEERING, 0)]);
    let result = run_sender(&mut joystick, sink).await;
    assert!(matches!(result, Err(LinkError::InputClosed)));

    watchdog.step().await.unwrap();
    assert_eq!(watchdog.health(), LinkHealth::Ok);
    let pwm = watchdog.driver().backend();
    assert_eq!(pwm.last_duty(STEERING_CHANNEL), Some(DutyCycle::MIN));
    assert_eq!(pwm.last_duty(WHEELS_CHANNEL), Some(DutyCycle::NEUTRAL));

    // Sender is gone: the next window times out and parks the vehicle
    let sink = connect(addr).await.unwrap();
    let mut joystick = Joystick(vec![InputEvent::abs(ABS_FORWARD, 255)]);
    let _ = run_sender(&mut joystick, sink).await;
    watchdog.step().await.unwrap();
    assert_eq!(
        watchdog.driver().backend().last_duty(WHEELS_CHANNEL),
        Some(DutyCycle::MAX)
    );

    watchdog.step().await.unwrap();
    assert_eq!(watchdog.health(), LinkHealth::Stale);
    let pwm = watchdog.driver().backend();
    assert_eq!(pwm.last_duty(STEERING_CHANNEL), Some(DutyCycle::NEUTRAL));
    assert_eq!(pwm.last_duty(WHEELS_CHANNEL), Some(DutyCycle::NEUTRAL));
}

#[tokio::test]
async fn test_short_datagram_ends_control_loop() {
    let (mut watchdog, addr) = vehicle().await;

    let rogue = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    rogue.send_to(&[2, 2], addr).await.unwrap();
    rogue.send_to(&[9], addr).await.unwrap();

    let result = watchdog.run().await;
    assert!(matches!(result, Err(LinkError::Wire(_))));

    let pwm = watchdog.driver().backend();
    assert_eq!(pwm.last_duty(STEERING_CHANNEL), Some(DutyCycle::NEUTRAL));
    assert_eq!(pwm.last_duty(WHEELS_CHANNEL), Some(DutyCycle::NEUTRAL));
}
