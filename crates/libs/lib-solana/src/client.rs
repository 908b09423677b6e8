//! # Solana RPC Client
//!
//! The connection facade of the wallet client: one long-lived nonblocking
//! RPC handle configured once from [`NetworkConfig`] and shared by every
//! caller.
//!
//! ## Features
//!
//! - **Balance and account reads**: lamport balance, raw account data
//! - **Transaction submission**: send-and-confirm, or send with a minimum
//!   context slot for wallet-signed transactions
//! - **Devnet airdrops**: faucet requests with rate-limit classification
//! - **Health checks**: lightweight `getVersion` call
//!
//! ## Timeouts
//!
//! The per-request timeout is `rpc_network_timeout` (30 s) and the
//! confirmation timeout is `rpc_connection_timeout` (2 min). Retries are left
//! to the caller; the client performs each request exactly once.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_solana::client::SolanaClient;
//! use solana_sdk::pubkey::Pubkey;
//! use std::str::FromStr;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let client = SolanaClient::builder().build();
//!
//! let pubkey = Pubkey::from_str("So11111111111111111111111111111111111111112").unwrap();
//! let lamports = client.get_balance(&pubkey).await?;
//! println!("Balance: {} lamports", lamports);
//!
//! client.health_check().await?;
//! # Ok(())
//! # }
//! ```

use lib_core::config::{devnet, NetworkConfig, LAMPORTS_PER_SOL, NETWORK_CONFIG};
use lib_core::{AppError, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, VersionedTransaction},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// High-level Solana RPC client wrapper.
///
/// Cheap to clone; clones share the same underlying HTTP connection pool.
#[derive(Clone)]
pub struct SolanaClient {
    rpc: Arc<RpcClient>,
    rpc_url: String,
}

/// Builder for configuring SolanaClient.
#[derive(Debug, Clone)]
pub struct SolanaClientBuilder {
    rpc_url: Option<String>,
    network: NetworkConfig,
}

impl Default for SolanaClientBuilder {
    fn default() -> Self {
        Self {
            rpc_url: None,
            network: NETWORK_CONFIG,
        }
    }
}

impl SolanaClientBuilder {
    /// Set a custom RPC URL (defaults to the devnet endpoint).
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Use a different set of network constants.
    pub fn network_config(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    /// Build the SolanaClient with configured settings.
    pub fn build(self) -> SolanaClient {
        let rpc_url = self.rpc_url.unwrap_or_else(|| devnet::RPC_ENDPOINT.to_string());

        info!(
            rpc_url = %rpc_url,
            network_timeout_ms = self.network.rpc_network_timeout.as_millis() as u64,
            "Connecting to Solana RPC"
        );

        let rpc = RpcClient::new_with_timeouts_and_commitment(
            rpc_url.clone(),
            self.network.rpc_network_timeout,
            CommitmentConfig::confirmed(),
            self.network.rpc_connection_timeout,
        );

        SolanaClient {
            rpc: Arc::new(rpc),
            rpc_url,
        }
    }
}

impl SolanaClient {
    /// Create a new Solana RPC client using a builder for configuration.
    pub fn builder() -> SolanaClientBuilder {
        SolanaClientBuilder::default()
    }

    /// Create a client from the application configuration.
    pub fn from_config(config: &lib_core::Config) -> Self {
        Self::builder()
            .rpc_url(config.rpc_url.clone())
            .network_config(config.network.clone())
            .build()
    }

    /// The endpoint this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get an account balance in lamports.
    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.rpc
            .get_balance(pubkey)
            .await
            .map_err(|e| AppError::Network(format!("Failed to get balance: {}", e)))
    }

    /// Retrieve account data, `None` when the account does not exist.
    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(pubkey, self.rpc.commitment())
            .await
            .map_err(|e| AppError::Network(format!("Failed to get account: {}", e)))?;
        Ok(response.value)
    }

    /// Get the latest blockhash for building transactions.
    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| AppError::Network(format!("Failed to get latest blockhash: {}", e)))
    }

    /// Send a signed legacy transaction and wait for confirmation.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.rpc
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| AppError::Network(format!("Failed to send transaction: {}", e)))
    }

    /// Broadcast a signed transaction, refusing nodes behind `min_context_slot`.
    ///
    /// Returns as soon as the node accepts the transaction.
    pub async fn send_transaction_with_min_slot(
        &self,
        transaction: &VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            min_context_slot: Some(min_context_slot),
            ..RpcSendTransactionConfig::default()
        };

        self.rpc
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| AppError::Network(format!("Failed to send transaction: {}", e)))
    }

    /// Request devnet SOL from the faucet.
    ///
    /// `amount_sol` is in whole SOL. The signature is returned once the faucet
    /// accepts the request; settlement is not awaited here.
    pub async fn request_airdrop(&self, pubkey: &Pubkey, amount_sol: f64) -> Result<Signature> {
        let lamports = sol_to_lamports(amount_sol)?;
        debug!(%pubkey, lamports, "Requesting airdrop");

        self.rpc.request_airdrop(pubkey, lamports).await.map_err(|e| {
            let err = classify_airdrop_error(&e.to_string());
            warn!(%pubkey, error = %err, "Airdrop request failed");
            err
        })
    }

    /// Check if the RPC endpoint is healthy and responsive.
    pub async fn health_check(&self) -> Result<()> {
        self.rpc
            .get_version()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Network(format!("Health check failed: {}", e)))
    }
}

/// Convert whole SOL to lamports, rejecting non-positive or non-finite amounts.
pub fn sol_to_lamports(amount_sol: f64) -> Result<u64> {
    if !amount_sol.is_finite() || amount_sol <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "Amount must be a positive number of SOL, got {}",
            amount_sol
        )));
    }
    Ok((amount_sol * LAMPORTS_PER_SOL as f64).round() as u64)
}

/// Convert lamports to SOL for display.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Map a faucet failure to `RateLimited` or `FaucetUnavailable`.
pub fn classify_airdrop_error(message: &str) -> AppError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
        AppError::RateLimited(message.to_string())
    } else {
        AppError::FaucetUnavailable(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(sol_to_lamports(2.0).unwrap(), 2_000_000_000);
        assert_eq!(sol_to_lamports(0.5).unwrap(), 500_000_000);
        assert!(matches!(sol_to_lamports(0.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(sol_to_lamports(-1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(sol_to_lamports(f64::NAN), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(1_500_000_000), 1.5);
        assert_eq!(lamports_to_sol(0), 0.0);
    }

    #[test]
    fn test_classify_airdrop_error() {
        assert!(matches!(
            classify_airdrop_error("HTTP status client error (429 Too Many Requests)"),
            AppError::RateLimited(_)
        ));
        assert!(matches!(
            classify_airdrop_error("airdrop request failed. This can happen when the rate limit is reached."),
            AppError::RateLimited(_)
        ));
        assert!(matches!(
            classify_airdrop_error("Internal error: faucet has run dry"),
            AppError::FaucetUnavailable(_)
        ));
    }

    #[test]
    fn test_builder_defaults_to_devnet() {
        let client = SolanaClient::builder().build();
        assert_eq!(client.rpc_url(), "https://api.devnet.solana.com");
        assert_eq!(client.rpc.commitment(), CommitmentConfig::confirmed());
    }
}
