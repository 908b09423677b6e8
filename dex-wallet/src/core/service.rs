//! # Service Traits
//!
//! Traits for dependency injection, so the store can run against the real
//! wallet, RPC client and swap router in production and against mocks in tests.

use crate::services::wallet::{Account, SignInPayload, WalletSession};
use async_trait::async_trait;
use lib_core::Result;
use lib_solana::jupiter::{decode_swap_transaction, QuoteResponse};
use lib_solana::{JupiterClient, SolanaClient};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};

/// Wallet authorization operations used by the application store.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Authorize with the wallet and remember the session
    async fn connect(&self) -> Result<Account>;

    /// Authorize with a sign-in message
    async fn sign_in(&self, payload: SignInPayload) -> Result<Account>;

    /// Deauthorize and forget the session
    async fn disconnect(&self) -> Result<()>;

    /// Have the wallet sign and submit a transaction
    async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature>;

    /// Have the wallet sign an arbitrary message
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Read-only snapshot of the held session
    fn session(&self) -> Option<WalletSession>;
}

/// Network operations used by the application store and the local wallet.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Balance in lamports
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64>;

    /// Request devnet SOL from the faucet
    async fn request_airdrop(&self, pubkey: &Pubkey, amount_sol: f64) -> Result<Signature>;

    /// Blockhash for transactions built locally
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// Broadcast a signed transaction
    async fn send_transaction_with_min_slot(
        &self,
        transaction: &VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature>;

    /// Cheap liveness check
    async fn health_check(&self) -> Result<()>;
}

// Implement the trait for the concrete RPC client
#[async_trait]
impl NetworkService for SolanaClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        SolanaClient::get_balance(self, pubkey).await
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, amount_sol: f64) -> Result<Signature> {
        SolanaClient::request_airdrop(self, pubkey, amount_sol).await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        SolanaClient::get_latest_blockhash(self).await
    }

    async fn send_transaction_with_min_slot(
        &self,
        transaction: &VersionedTransaction,
        min_context_slot: u64,
    ) -> Result<Signature> {
        SolanaClient::send_transaction_with_min_slot(self, transaction, min_context_slot).await
    }

    async fn health_check(&self) -> Result<()> {
        SolanaClient::health_check(self).await
    }
}

/// Swap routing used by the application store.
#[async_trait]
pub trait SwapService: Send + Sync {
    /// Best route for `amount` base units of `input_mint`
    async fn quote(&self, input_mint: &str, output_mint: &str, amount: u64, slippage_bps: u16)
        -> Result<QuoteResponse>;

    /// Unsigned transaction executing `quote` for `user`
    async fn swap_transaction(&self, quote: &QuoteResponse, user: &Pubkey) -> Result<VersionedTransaction>;
}

#[async_trait]
impl SwapService for JupiterClient {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<QuoteResponse> {
        self.get_swap_quote(input_mint, output_mint, amount, slippage_bps).await
    }

    async fn swap_transaction(&self, quote: &QuoteResponse, user: &Pubkey) -> Result<VersionedTransaction> {
        let response = self.get_swap_transaction(quote, &user.to_string()).await?;
        decode_swap_transaction(&response)
    }
}
