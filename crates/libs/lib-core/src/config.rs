//! # Application Configuration
//!
//! Two layers of configuration live here:
//!
//! - [`NetworkConfig`] / [`NETWORK_CONFIG`]: fixed timeout, interval and retry
//!   constants. They are compiled in and never edited at runtime.
//! - [`devnet`]: cluster endpoints, token mints, API bases and
//!   rate limits for the devnet deployment.
//!
//! [`Config`] combines both with the few values that may come from the
//! environment (`SOLANA_RPC_URL`, `DEX_DATA_DIR`, `JUPITER_API_BASE`).
//!
//! ## Global Config Access
//!
//! The binary calls [`init_config()`] once at startup; library code receives a
//! `Config` by value through its constructors instead of reading the global.
//!
//! ```rust,no_run
//! use lib_core::config::init_config;
//!
//! let config = init_config()?;
//! println!("RPC endpoint: {}", config.rpc_url);
//! # Ok::<(), lib_core::AppError>(())
//! ```

use crate::error::{AppError, Result};
use lib_utils::envs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Network and timeout constants.
///
/// `rpc_retry_delay_base` and `max_retry_attempts` are published for callers
/// that want them; nothing in the workspace runs a retry loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Transaction confirmation timeout
    pub rpc_connection_timeout: Duration,
    /// Per-request RPC timeout
    pub rpc_network_timeout: Duration,
    /// Base delay between retries
    pub rpc_retry_delay_base: Duration,
    /// Refresh the wallet auth token when it is older than this
    pub auth_token_refresh_threshold: Duration,
    /// Interval between RPC health checks
    pub connection_check_interval: Duration,
    /// Jupiter quote request timeout
    pub jupiter_quote_timeout: Duration,
    /// Jupiter swap transaction request timeout
    pub jupiter_swap_timeout: Duration,
    /// Settlement delay before re-reading balances after funds arrive
    pub balance_reload_delay: Duration,
    /// Background balance refresh interval while signed in
    pub balance_poll_interval: Duration,
    /// Maximum number of retry attempts
    pub max_retry_attempts: u32,
    /// Failed health checks before suggesting a reconnection
    pub reconnection_retry_threshold: u32,
}

/// The compiled-in network constants.
pub const NETWORK_CONFIG: NetworkConfig = NetworkConfig {
    rpc_connection_timeout: Duration::from_secs(120),
    rpc_network_timeout: Duration::from_secs(30),
    rpc_retry_delay_base: Duration::from_secs(2),
    auth_token_refresh_threshold: Duration::from_secs(600),
    connection_check_interval: Duration::from_secs(120),
    jupiter_quote_timeout: Duration::from_secs(120),
    jupiter_swap_timeout: Duration::from_secs(120),
    balance_reload_delay: Duration::from_secs(2),
    balance_poll_interval: Duration::from_secs(5),
    max_retry_attempts: 3,
    reconnection_retry_threshold: 3,
};

impl Default for NetworkConfig {
    fn default() -> Self {
        NETWORK_CONFIG
    }
}

/// Devnet deployment constants.
pub mod devnet {
    pub const RPC_ENDPOINT: &str = "https://api.devnet.solana.com";
    pub const CHAIN_ID: &str = "solana:devnet";
    pub const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";
    pub const CLUSTER: &str = "devnet";

    /// Token mints on devnet.
    pub mod tokens {
        pub const SOL: &str = "So11111111111111111111111111111111111111112";
        pub const USDC: &str = "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU";
        pub const USDT: &str = "EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS";
    }

    pub const JUPITER_API: &str = "https://quote-api.jup.ag/v6";
    pub const JUPITER_TOKEN_LIST: &str = "https://token.jup.ag/all";

    /// Requests per minute allowed towards Jupiter.
    pub const JUPITER_REQUESTS_PER_MINUTE: u32 = 10;

    /// Default airdrop amount in SOL.
    pub const DEFAULT_AIRDROP_AMOUNT: f64 = 2.0;
}

/// Explorer link for a transaction signature.
pub fn explorer_tx_url(signature: &str) -> String {
    format!("{}/tx/{}?cluster={}", devnet::EXPLORER_BASE_URL, signature, devnet::CLUSTER)
}

/// Explorer link for an account address.
pub fn explorer_account_url(address: &str) -> String {
    format!("{}/account/{}?cluster={}", devnet::EXPLORER_BASE_URL, address, devnet::CLUSTER)
}

/// Explorer link for a token mint.
pub fn explorer_token_url(mint: &str) -> String {
    format!("{}/token/{}?cluster={}", devnet::EXPLORER_BASE_URL, mint, devnet::CLUSTER)
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,

    /// Jupiter quote/swap API base URL
    pub jupiter_api_base: String,

    /// Jupiter token list URL
    pub token_list_url: String,

    /// Directory for persisted preferences
    pub data_dir: PathBuf,

    /// Fixed network constants
    pub network: NetworkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: devnet::RPC_ENDPOINT.to_string(),
            jupiter_api_base: devnet::JUPITER_API.to_string(),
            token_list_url: devnet::JUPITER_TOKEN_LIST.to_string(),
            data_dir: PathBuf::from("data"),
            network: NETWORK_CONFIG,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, defaulting to devnet.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let rpc_url = envs::get_env("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url);
        let jupiter_api_base = envs::get_env("JUPITER_API_BASE").unwrap_or(defaults.jupiter_api_base);
        let data_dir = envs::get_env("DEX_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Ok(Self {
            rpc_url,
            jupiter_api_base,
            token_list_url: defaults.token_list_url,
            data_dir,
            network: NETWORK_CONFIG,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("SOLANA_RPC_URL", &self.rpc_url), ("JUPITER_API_BASE", &self.jupiter_api_base)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!("{} must be an http(s) URL, got '{}'", name, url)));
            }
        }

        if self.network.rpc_network_timeout.is_zero() || self.network.rpc_connection_timeout.is_zero() {
            return Err(AppError::Config("RPC timeouts must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// Loads a `.env` file when present, reads the environment and validates the
/// result.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<&'static Config> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| AppError::Config("Config has already been initialized".to_string()))?;
    CONFIG
        .get()
        .ok_or_else(|| AppError::Internal("Config missing right after initialization".to_string()))
}
