// Joystick feed: reads a Linux joystick and streams intents to the vehicle
//
// Usage: joystick_feed /dev/input/event0 [--target 192.168.1.20:4000]

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vehicle_link::config::DEFAULT_CONTROL_ADDR;
use vehicle_link::input::EventDevice;
use vehicle_link::transmitter::{connect, run_sender};

#[derive(Debug, Parser)]
#[command(version, about = "Streams joystick input to the vehicle over UDP")]
struct Cli {
    /// Joystick event device
    device: PathBuf,

    /// Vehicle address
    #[arg(long, default_value = DEFAULT_CONTROL_ADDR)]
    target: SocketAddr,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut device = match EventDevice::open(&cli.device).await {
        Ok(device) => device,
        Err(e) => {
            eprintln!("Can't open {}: {}", cli.device.display(), e);
            std::process::exit(1);
        }
    };

    let socket = match connect(cli.target).await {
        Ok(socket) => socket,
        Err(e) => {
            eprintln!("connect: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_sender(&mut device, socket).await {
        eprintln!("Joystick feed error: {}", e);
        std::process::exit(1);
    }
}
