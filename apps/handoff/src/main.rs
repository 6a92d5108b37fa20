use handoff::demo::run as RunHandoff;
use handoff::error::HandoffAppError;
use handoff::logger::initialize as LoggerInitialize;

use handoff_core::config::{HandoffConfig, default_config_dir};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;

use log::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = start().await {
        error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn start() -> Result<(), HandoffAppError> {
    let config_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => default_config_dir().map_err(|e| HandoffAppError::Core {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?,
    };

    create_dir_all(&config_dir).map_err(|e| HandoffAppError::Handoff {
        message: format!("Failed to create config directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Logger first, so config loading is logged
    LoggerInitialize(&config_dir)?;

    info!("Handoff demo starting");
    info!("Config directory: {}", config_dir.display());

    let config = HandoffConfig::load(&config_dir).map_err(|e| HandoffAppError::Core {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let report = RunHandoff(&config).await?;

    info!(
        "Session {} paired at {} after {} poll(s)",
        report.session,
        report.address.as_deref().unwrap_or("<no listener>"),
        report.polls
    );
    Ok(())
}
