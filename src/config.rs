// Ports, timing, PWM limits and input codes
use std::time::Duration;

// UDP port the vehicle listens on (all interfaces)
pub const CONTROL_PORT: u16 = 4000;

// Where the joystick feed sends by default
pub const DEFAULT_CONTROL_ADDR: &str = "127.0.0.1:4000";

// Maximum transmission rate of the joystick feed
pub const SEND_RATE_HZ: u32 = 30;

// Minimum spacing between two transmissions
pub const SEND_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / SEND_RATE_HZ as u64);

// Watchdog: actuators go neutral if nothing arrives within this window
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_millis(500);

// PWM duty cycle limits (nanoseconds)
pub const PWM_MIN: u32 = 1_000_000;
pub const PWM_NEUTRAL: u32 = 1_500_000;
pub const PWM_MAX: u32 = 2_000_000;

// PWM period (nanoseconds), 20 Hz
pub const PWM_PERIOD: u32 = 50_000_000;

// Sysfs PWM chip driving both channels
pub const PWM_CHIP_ROOT: &str = "/sys/class/pwm/pwmchip0";

// Channel indices on the PWM chip
pub const WHEELS_CHANNEL: u32 = 0;
pub const STEERING_CHANNEL: u32 = 1;

// Linux input event types and absolute axis codes used by the joystick
pub const EV_ABS: u16 = 3;
pub const ABS_STEERING: u16 = 0; // left stick X
pub const ABS_REVERSE: u16 = 2; // left trigger
pub const ABS_FORWARD: u16 = 5; // right trigger
