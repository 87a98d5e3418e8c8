//! Niyantra daemon entry point
//!
//! Wires the serial base driver, the streaming glue and the control loop
//! together, and translates SIGINT/SIGTERM into a clean shutdown.

use niyantra::config::AppConfig;
use niyantra::control::ControlLoop;
use niyantra::devices::SerialBase;
use niyantra::error::Result;
use niyantra::motion::{CommandCell, VelocityMapper};
use niyantra::streaming::{CommandReceiver, TelemetryPublisher};
use niyantra::transport::SerialTransport;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `niyantra <path>` (positional)
/// - `niyantra --config <path>` (flag-based)
/// - `niyantra -c <path>` (short flag)
///
/// Defaults to `/etc/niyantra.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "/etc/niyantra.toml".to_string()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Niyantra v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("Niyantra stopped on fault: {}", e);
        std::process::exit(1);
    }

    log::info!("Niyantra stopped");
}

fn run() -> Result<()> {
    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::warn!("Config {} not found, using defaults", config_path);
        AppConfig::botvac_defaults()
    };

    // Shared pending command, written by the receiver, read by the loop
    let pending = Arc::new(CommandCell::new());

    let publisher = TelemetryPublisher::bind(&config.streaming.telemetry_address)?;
    let mapper = VelocityMapper::new(config.robot.track_width_m, config.robot.max_wheel_speed);
    let receiver = CommandReceiver::bind(
        &config.streaming.command_address,
        mapper,
        Arc::clone(&pending),
    )?;

    log::info!("Connecting to base controller on {}", config.hardware.port);
    let transport = SerialTransport::open(&config.hardware.port, config.hardware.baud_rate)?;
    let driver = SerialBase::new(transport);

    let running = Arc::new(AtomicBool::new(true));
    setup_signal_handler(Arc::clone(&running))?;

    let mut control = ControlLoop::new(driver, &config, pending, publisher.sender());
    let result = control.run(&running);

    receiver.stop();
    publisher.stop();
    result
}

/// Translate SIGINT/SIGTERM into the shared running flag
fn setup_signal_handler(running: Arc<AtomicBool>) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                log::info!("Received signal {:?}, shutting down...", sig);
                running.store(false, Ordering::Relaxed);
            }
        })?;

    Ok(())
}
