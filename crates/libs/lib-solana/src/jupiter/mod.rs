//! # Jupiter Aggregator Client
//!
//! Swap quotes, swap transactions and the token list from Jupiter. Every
//! request goes through one shared rate limiter
//! ([`JUPITER_REQUESTS_PER_MINUTE`](lib_core::config::devnet::JUPITER_REQUESTS_PER_MINUTE)).

// region: --- Modules
pub mod types;
pub mod client;
pub mod quote;
pub mod swap;
// endregion: --- Modules

// region: --- Main Client
use client::JupiterHttpClient;
use lib_core::config::{devnet, NETWORK_CONFIG};
use lib_core::{AppError, Result};
use std::time::Duration;

/// Builder for configuring JupiterClient.
#[derive(Debug, Clone)]
pub struct JupiterClientBuilder {
    timeout: Duration,
    api_base: String,
    token_list_url: String,
    requests_per_minute: u32,
}

impl Default for JupiterClientBuilder {
    fn default() -> Self {
        Self {
            timeout: NETWORK_CONFIG.jupiter_quote_timeout,
            api_base: devnet::JUPITER_API.to_string(),
            token_list_url: devnet::JUPITER_TOKEN_LIST.to_string(),
            requests_per_minute: devnet::JUPITER_REQUESTS_PER_MINUTE,
        }
    }
}

impl JupiterClientBuilder {
    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the quote/swap API base URL.
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the token list URL.
    pub fn token_list_url(mut self, url: impl Into<String>) -> Self {
        self.token_list_url = url.into();
        self
    }

    /// Set the request budget per minute. Zero is treated as one.
    pub fn requests_per_minute(mut self, n: u32) -> Self {
        self.requests_per_minute = n;
        self
    }

    /// Build the JupiterClient with configured settings.
    pub fn build(self) -> Result<JupiterClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let inner = JupiterHttpClient::with_settings(
            http,
            self.api_base,
            self.token_list_url,
            self.requests_per_minute,
        );

        Ok(JupiterClient { inner })
    }
}

/// Client for Jupiter Aggregator API
pub struct JupiterClient {
    inner: JupiterHttpClient,
}

impl JupiterClient {
    /// Create a new Jupiter client using a builder for configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lib_solana::jupiter::JupiterClient;
    ///
    /// let client = JupiterClient::builder()
    ///     .timeout(std::time::Duration::from_secs(30))
    ///     .api_base("https://quote-api.jup.ag/v6")
    ///     .build()?;
    /// # Ok::<(), lib_core::AppError>(())
    /// ```
    pub fn builder() -> JupiterClientBuilder {
        JupiterClientBuilder::default()
    }

    /// Create a client from the application configuration.
    pub fn from_config(config: &lib_core::Config) -> Result<Self> {
        Self::builder()
            .timeout(config.network.jupiter_quote_timeout.max(config.network.jupiter_swap_timeout))
            .api_base(config.jupiter_api_base.clone())
            .token_list_url(config.token_list_url.clone())
            .build()
    }

    pub fn api_base(&self) -> &str {
        &self.inner.api_base
    }

    // Delegate methods to inner client
    pub async fn load_token_list(&self) -> Result<()> {
        self.inner.load_token_list().await
    }

    pub async fn get_mint_for_symbol(&self, symbol: &str) -> Option<String> {
        self.inner.get_mint_for_symbol(symbol).await
    }

    pub async fn get_all_tokens(&self) -> Option<Vec<types::TokenInfo>> {
        self.inner.get_all_tokens().await
    }

    /// Fetch complete token list with metadata from Jupiter (direct API call, not cached)
    pub async fn get_token_list(&self) -> Result<Vec<types::TokenInfo>> {
        self.inner.get_token_list().await
    }

    pub async fn get_swap_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<types::QuoteResponse> {
        self.inner.get_swap_quote(input_mint, output_mint, amount, slippage_bps).await
    }

    pub async fn get_swap_transaction(
        &self,
        quote_response: &types::QuoteResponse,
        user_public_key: &str,
    ) -> Result<types::SwapTransactionResponse> {
        self.inner.get_swap_transaction(quote_response, user_public_key).await
    }
}
// endregion: --- Main Client

// Re-export commonly used types
pub use swap::decode_swap_transaction;
pub use types::*;
