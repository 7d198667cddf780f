mod chase;
mod config;
mod controller;
mod error;
mod hat;
mod peripheral;

use anyhow::{Context, Result};
use controller::{Controller, Schedule, Tick};
use log::{info, warn};
use peripheral::KeyEvent;
use std::fs;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    init_logger();

    info!("Rainbow HAT demo starting...");
    let config = load_config()?;

    // Button edges arrive on rppal's interrupt thread and are queued here
    let (key_tx, mut key_rx) = mpsc::channel::<KeyEvent>(32);
    let mut board = hat::RainbowHat::new(config.debounce(), key_tx);
    let mut controller = Controller::start(&mut board, &config);
    if !controller.animating() {
        warn!("Running without LED animation");
    }

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let mut schedule = Schedule::new();

    info!("Demo started successfully");

    loop {
        tokio::select! {
            _ = schedule.wait() => {
                let tick = controller.tick();
                if tick == Tick::Stop {
                    info!("LED animation stopped");
                }
                schedule.after(tick);
            }
            Some(event) = key_rx.recv() => {
                controller.handle(event);
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
        }
    }

    controller.shutdown();
    info!("Rainbow HAT demo shutdown complete");
    Ok(())
}

fn load_config() -> Result<config::Config> {
    let Some(config_path) = std::env::args().nth(1) else {
        info!("No configuration file given, using Rainbow HAT defaults");
        return Ok(config::Config::default());
    };

    info!("Loading configuration from: {}", config_path);
    let config_content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config file: {}", config_path))?;
    let config: config::Config = serde_yaml::from_str(&config_content)
        .context("Failed to parse configuration file")?;
    info!("Configuration loaded successfully");
    Ok(config)
}

fn init_logger() {
    // Use `env_logger` for logging. Systemd/journald will capture stdout/stderr.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
