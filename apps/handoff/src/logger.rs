//! Logging for the handoff host: coloured stdout plus a plain log file.

use crate::error::HandoffAppError;

use common::ErrorLocation;

use std::fmt::{Arguments, Display};
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "handoff.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger, writing to stdout and `{log_dir}/handoff.log`.
///
/// Only the first call installs anything; later calls warn and return `Ok`.
///
/// # Errors
///
/// Returns [`HandoffAppError::Handoff`] if the log file cannot be opened or
/// another logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), HandoffAppError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = install(log_dir);
        if result.is_ok() {
            info!("Logger initialized with level: {LOG_LEVEL:?}");
        }
    });

    result
}

fn write_line(
    out: FormatCallback<'_>,
    message: &Arguments<'_>,
    record: &Record<'_>,
    level: &dyn Display,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}

#[track_caller]
fn install(log_dir: &Path) -> Result<(), HandoffAppError> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| {
        HandoffAppError::Handoff {
            message: format!("Failed to create log file in {}: {e}", log_dir.display()),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let console = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, message, record, &colors.color(record.level()))
        })
        .chain(stdout());

    let file = Dispatch::new()
        .format(|out, message, record| write_line(out, message, record, &record.level()))
        .chain(log_file);

    Dispatch::new()
        .level(LOG_LEVEL)
        // rustls is chatty at debug
        .level_for("rustls", LevelFilter::Info)
        .chain(console)
        .chain(file)
        .apply()
        .map_err(|e| HandoffAppError::Handoff {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
