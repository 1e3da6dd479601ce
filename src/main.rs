use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vehicle_link::LinkError;
use vehicle_link::actuator::{SimulatedPwm, SysfsPwm};
use vehicle_link::config::CONTROL_PORT;
use vehicle_link::watchdog::run_receiver;

/// Vehicle controller: drives the steering and wheel PWM channels from UDP
/// commands and parks them at neutral when commands stop.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], CONTROL_PORT)))]
    bind: SocketAddr,

    /// Drive a sysfs PWM chip directly (e.g. /sys/class/pwm/pwmchip0)
    /// instead of the board's hardware PWM
    #[arg(long)]
    pwm_root: Option<PathBuf>,

    /// Log duty-cycle writes instead of touching hardware
    #[arg(long)]
    simulate: bool,
}

#[cfg(feature = "real-actuators")]
async fn run_hardware(bind: SocketAddr) -> Result<(), LinkError> {
    run_receiver(bind, vehicle_link::actuator::RppalPwm::new()).await
}

#[cfg(not(feature = "real-actuators"))]
async fn run_hardware(bind: SocketAddr) -> Result<(), LinkError> {
    run_receiver(bind, SysfsPwm::new(vehicle_link::config::PWM_CHIP_ROOT)).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr (set RUST_LOG=debug to see every command)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = if cli.simulate {
        run_receiver(cli.bind, SimulatedPwm::new()).await
    } else if let Some(root) = cli.pwm_root {
        run_receiver(cli.bind, SysfsPwm::new(root)).await
    } else {
        run_hardware(cli.bind).await
    };

    if let Err(e) = result {
        eprintln!("Vehicle controller error: {}", e);
        std::process::exit(1);
    }
}
