//! Logging configuration from environment variables

use lib_utils::envs::{get_env, get_env_flag};
use std::path::PathBuf;

const DEFAULT_FILTER: &str = "dex_wallet=info,lib_solana=info,warn";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory holding the daily log files
    pub log_dir: PathBuf,
    /// File name prefix; the date is appended on rotation
    pub file_prefix: String,
    /// Filter directive (e.g., "dex_wallet=debug,info")
    pub log_level: String,
    /// Mirror logs to stdout
    pub log_to_stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            file_prefix: "dex-wallet.log".to_string(),
            log_level: DEFAULT_FILTER.to_string(),
            log_to_stdout: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from `RUST_LOG`, `DEX_LOG_DIR` and `DEX_LOG_STDOUT`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            log_dir: get_env("DEX_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            file_prefix: defaults.file_prefix,
            log_level: get_env("RUST_LOG").unwrap_or(defaults.log_level),
            log_to_stdout: get_env_flag("DEX_LOG_STDOUT", defaults.log_to_stdout),
        }
    }

    /// Path of today's log file is `log_dir/file_prefix.YYYY-MM-DD`
    pub fn log_file_stem(&self) -> PathBuf {
        self.log_dir.join(&self.file_prefix)
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.log_file_stem(), PathBuf::from("logs/dex-wallet.log"));
        assert!(!config.is_debug_enabled());
        assert!(!config.log_to_stdout);
    }

    #[test]
    fn test_debug_detection() {
        let config = LogConfig {
            log_level: "dex_wallet=debug,warn".to_string(),
            ..LogConfig::default()
        };
        assert!(config.is_debug_enabled());
    }
}
