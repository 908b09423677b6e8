//! File-based logging initialization

use super::config::LogConfig;
use std::fs;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("Failed to create log directory: {0}")]
    CreateDir(#[from] std::io::Error),

    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Keeps the background log writer alive. Dropping it flushes and stops file logging.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initialize the logging system
///
/// - daily rotated file under `config.log_dir`
/// - optional stdout mirror
/// - non-blocking writes
/// - panic hook that records panics in the log
pub fn init(config: &LogConfig) -> Result<LogGuard, LogInitError> {
    fs::create_dir_all(&config.log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(&config.log_level).map_err(|e| LogInitError::Filter {
        filter: config.log_level.clone(),
        reason: e.to_string(),
    })?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI codes in log files

    let stdout_layer = config
        .log_to_stdout
        .then(|| fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LogInitError::AlreadyInstalled(e.to_string()))?;

    tracing::info!(
        log_file = %config.log_file_stem().display(),
        log_level = %config.log_level,
        stdout = config.log_to_stdout,
        "Logging initialized"
    );

    setup_panic_hook();

    Ok(LogGuard { _file: guard })
}

/// Set up panic hook to log panics with their location
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        tracing::error!(location = %location, message = %message, "Application panic");

        default_panic(panic_info);
    }));
}
