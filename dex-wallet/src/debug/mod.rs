//! # Logging and Task Diagnostics
//!
//! - **File-based logging**: structured logs to `logs/dex-wallet.log.<date>`
//!   (daily rotation), optionally mirrored to stdout
//! - **Task tracking**: lifecycle logs for the store's background tasks
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: filter directive (e.g., `dex_wallet=debug,info`)
//! - `DEX_LOG_DIR`: log directory (default: `logs`)
//! - `DEX_LOG_STDOUT`: also log to stdout (`1`/`true`)

pub mod config;
pub mod logger;
pub mod task_tracker;

pub use config::LogConfig;
pub use logger::{init as init_logger, LogGuard, LogInitError};
pub use task_tracker::{active_task_count, spawn_tracked};
