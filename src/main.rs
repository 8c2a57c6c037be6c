//! Microwave controller: simulated appliance driven from the keyboard.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  stdin key reader ─▶ ChannelActions     LogDisplay           │
//! │  (ActionSource)                         (DisplaySink)        │
//! │                                                              │
//! │  ─────────────────── Port Trait Boundary ─────────────────   │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  SystemController · FaultHandler · ProgramController   │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  Actuator loops: magnetron · cooling fan · light             │
//! │  SimulatedSensors (heat models over the leaf devices)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `microwave [config.json]`. Log verbosity follows `RUST_LOG`
//! (default `info`).

use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use microwave::adapters::actions::{ChannelActions, spawn_key_reader};
use microwave::adapters::log_display::LogDisplay;
use microwave::{Appliance, SystemConfig, SystemController};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}

fn load_config() -> Result<SystemConfig> {
    match std::env::args().nth(1) {
        Some(path) => SystemConfig::load(Path::new(&path))
            .with_context(|| format!("loading configuration from {path}")),
        None => Ok(SystemConfig::default()),
    }
}

fn main() -> Result<()> {
    init_logging();
    let config = load_config()?;

    info!("Microwave controller v{}", env!("CARGO_PKG_VERSION"));
    info!("Keys: enter=start, start <name>, o/c=door, p/r=pause/resume, s=stop, esc=off");

    let appliance = Appliance::simulated(config);
    let (tx, actions) = ChannelActions::channel();
    // Detached: blocks on stdin until EOF.
    let _reader = spawn_key_reader(BufReader::new(std::io::stdin()), tx);

    let system = SystemController::new(appliance, Box::new(actions), Box::new(LogDisplay::new()));
    system.start();
    system.wait();

    info!("Controller stopped");
    Ok(())
}
