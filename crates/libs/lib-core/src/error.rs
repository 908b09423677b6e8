//! # Centralized Error Handling
//!
//! This module defines the error type [`AppError`] shared by every crate in the
//! workspace. It follows the `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Wallet authorization** - the external wallet refused or is missing
//!    - [`AuthorizationDenied`](AppError::AuthorizationDenied)
//!    - [`NoWalletAvailable`](AppError::NoWalletAvailable)
//!    - [`MalformedPayload`](AppError::MalformedPayload)
//!
//! 2. **Signing** - the wallet was reached but did not produce a result
//!    - [`WalletRejected`](AppError::WalletRejected)
//!    - [`NoSignatureReturned`](AppError::NoSignatureReturned)
//!
//! 3. **Network** - RPC, faucet and HTTP API failures
//!    - [`Network`](AppError::Network)
//!    - [`FaucetUnavailable`](AppError::FaucetUnavailable)
//!    - [`RateLimited`](AppError::RateLimited)
//!
//! 4. **Local** - state, input and configuration problems
//!    - [`NotConnected`](AppError::NotConnected), [`InvalidInput`](AppError::InvalidInput),
//!      [`Config`](AppError::Config), [`Decoding`](AppError::Decoding),
//!      [`Superseded`](AppError::Superseded), [`Internal`](AppError::Internal)
//!
//! ## Propagation
//!
//! Authorization and signing errors travel unchanged to the UI layer, which
//! shows them as a blocking alert (see [`AppError::user_message`]). Disconnect
//! errors are the exception: the store logs them and still signs the user out.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn parse_amount(amount: f64) -> Result<f64> {
//!     if amount <= 0.0 {
//!         return Err(AppError::InvalidInput("Amount must be positive".to_string()));
//!     }
//!     Ok(amount)
//! }
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
///
/// Variants are `Clone` so a failed mutation can keep its last error around
/// for the UI to read after the future has resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The user rejected the authorization request in the wallet app.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// No wallet app able to speak the wallet protocol is installed.
    #[error("No compatible wallet app available")]
    NoWalletAvailable,

    /// The sign-in payload (domain/statement) failed validation.
    #[error("Malformed sign-in payload: {0}")]
    MalformedPayload(String),

    /// The wallet refused to sign or send.
    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    /// The wallet answered a signing request with an empty result list.
    ///
    /// Treated as a hard failure, never as a retry condition.
    #[error("No signature returned from wallet")]
    NoSignatureReturned,

    /// Solana RPC or HTTP transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The devnet faucet could not serve the airdrop.
    #[error("Faucet unavailable: {0}")]
    FaucetUnavailable(String),

    /// The faucet or an API refused the request because of rate limits.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// An operation needs a signed-in wallet and there is none.
    #[error("Wallet not connected")]
    NotConnected,

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data decoding error (base58, base64, bincode, JSON).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// A newer session change (connect or disconnect) started while this
    /// operation was in flight; its result was discarded.
    #[error("Operation superseded by a newer session change")]
    Superseded,

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error came from the user or wallet declining, as opposed to a fault.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, AppError::AuthorizationDenied(_) | AppError::WalletRejected(_))
    }

    /// Get a user-friendly error message for the alert dialog.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::AuthorizationDenied(_) => "Wallet authorization was cancelled".to_string(),
            AppError::NoWalletAvailable => {
                "No compatible wallet app found. Install a Solana wallet and try again".to_string()
            }
            AppError::MalformedPayload(msg) => msg.clone(),
            AppError::WalletRejected(_) => "The wallet declined the request".to_string(),
            AppError::NoSignatureReturned => "The wallet did not return a signature".to_string(),
            AppError::Network(_) => "Network unavailable, please try again".to_string(),
            AppError::FaucetUnavailable(_) => "Airdrop faucet is unavailable right now".to_string(),
            AppError::RateLimited(_) => "Too many requests, wait a moment and try again".to_string(),
            AppError::NotConnected => "Connect a wallet first".to_string(),
            AppError::Superseded => "Wallet session changed, please try again".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Config(_) | AppError::Decoding(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(format!("JSON error: {}", err))
    }
}

impl From<lib_utils::envs::Error> for AppError {
    fn from(err: lib_utils::envs::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AppError::NoSignatureReturned.to_string(),
            "No signature returned from wallet"
        );
        assert_eq!(
            AppError::Network("timeout".to_string()).to_string(),
            "Network error: timeout"
        );
    }

    #[test]
    fn test_user_rejection_classification() {
        assert!(AppError::AuthorizationDenied("user cancelled".into()).is_user_rejection());
        assert!(AppError::WalletRejected("declined".into()).is_user_rejection());
        assert!(!AppError::NoSignatureReturned.is_user_rejection());
    }

    #[test]
    fn test_internal_details_hidden_from_user() {
        let err = AppError::Internal("mutex poisoned at store.rs:42".to_string());
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_env_error_maps_to_config() {
        let err: AppError = lib_utils::envs::Error::WrongFormat("SOLANA_RPC_URL").into();
        assert!(matches!(err, AppError::Config(_)));
    }
}
