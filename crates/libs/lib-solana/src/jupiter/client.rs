//! # Jupiter HTTP Client
//!
//! HTTP client wrapper, request rate limiting and token list caching for the
//! Jupiter API.

use super::types::TokenInfo;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lib_core::config::devnet;
use lib_core::{AppError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Token list entries older than this are reloaded on the next lookup.
pub(crate) const TOKEN_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Cached token list data structure
pub struct TokenCache {
    /// Map of uppercase symbol to mint address
    symbol_to_mint: HashMap<String, String>,
    /// Full list of tokens
    tokens: Vec<TokenInfo>,
    /// When the cache was last refreshed
    last_refresh: Instant,
}

impl TokenCache {
    /// Index a freshly fetched token list. The first token wins on duplicate symbols.
    pub fn from_tokens(tokens: Vec<TokenInfo>) -> Self {
        let mut symbol_to_mint = HashMap::new();
        for token in &tokens {
            symbol_to_mint
                .entry(token.symbol.to_uppercase())
                .or_insert_with(|| token.address.clone());
        }

        Self {
            symbol_to_mint,
            tokens,
            last_refresh: Instant::now(),
        }
    }

    pub fn mint_for_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_mint.get(&symbol.to_uppercase()).map(String::as_str)
    }

    pub fn is_stale(&self) -> bool {
        self.last_refresh.elapsed() > TOKEN_CACHE_TTL
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }
}

/// Devnet mints for the handful of tokens the app always knows about.
pub(crate) fn builtin_mint(symbol: &str) -> Option<&'static str> {
    match symbol.to_uppercase().as_str() {
        "SOL" | "WSOL" => Some(devnet::tokens::SOL),
        "USDC" => Some(devnet::tokens::USDC),
        "USDT" => Some(devnet::tokens::USDT),
        _ => None,
    }
}

/// HTTP client wrapper for Jupiter API
pub struct JupiterHttpClient {
    pub http: Client,
    pub api_base: String,
    pub token_list_url: String,
    pub(crate) limiter: Arc<DefaultDirectRateLimiter>,
    /// Cached token list with symbol→mint mapping
    pub token_cache: Arc<RwLock<Option<TokenCache>>>,
}

impl JupiterHttpClient {
    pub(crate) fn with_settings(
        http: Client,
        api_base: String,
        token_list_url: String,
        requests_per_minute: u32,
    ) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            http,
            api_base,
            token_list_url,
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Wait for a request slot.
    pub(crate) async fn throttle(&self) {
        if self.limiter.check().is_err() {
            debug!("Jupiter request throttled, waiting for a slot");
            self.limiter.until_ready().await;
        }
    }

    /// Load and cache token list from Jupiter API
    pub async fn load_token_list(&self) -> Result<()> {
        let tokens = self.get_token_list().await?;
        let cache = TokenCache::from_tokens(tokens);
        let count = cache.tokens.len();

        *self.token_cache.write().await = Some(cache);
        info!(count, "Token list cached");

        Ok(())
    }

    /// Get mint address for a token symbol.
    ///
    /// Reloads the token list when it is missing or stale, and falls back to
    /// the built-in devnet mints when the list is unreachable.
    pub async fn get_mint_for_symbol(&self, symbol: &str) -> Option<String> {
        let needs_refresh = {
            let cache = self.token_cache.read().await;
            match cache.as_ref() {
                Some(cache) if !cache.is_stale() => {
                    if let Some(mint) = cache.mint_for_symbol(symbol) {
                        return Some(mint.to_string());
                    }
                    false
                }
                _ => true,
            }
        };

        if needs_refresh {
            if let Err(e) = self.load_token_list().await {
                tracing::warn!("Failed to refresh token list: {}", e);
            } else if let Some(mint) = self
                .token_cache
                .read()
                .await
                .as_ref()
                .and_then(|c| c.mint_for_symbol(symbol).map(str::to_string))
            {
                return Some(mint);
            }
        }

        builtin_mint(symbol).map(str::to_string)
    }

    /// Get all cached tokens
    pub async fn get_all_tokens(&self) -> Option<Vec<TokenInfo>> {
        let cache = self.token_cache.read().await;
        cache.as_ref().map(|c| c.tokens.clone())
    }

    /// Fetch complete token list with metadata from Jupiter
    pub async fn get_token_list(&self) -> Result<Vec<TokenInfo>> {
        self.throttle().await;

        self.http
            .get(&self.token_list_url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Jupiter token list request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("Jupiter token list parse failed: {}", e)))
    }
}
