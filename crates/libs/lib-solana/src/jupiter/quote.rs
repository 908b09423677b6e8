//! # Jupiter Quote API
//!
//! Quote API integration for getting swap quotes from Jupiter.

use super::client::JupiterHttpClient;
use super::types::QuoteResponse;
use lib_core::{AppError, Result};
use tracing::debug;

impl JupiterHttpClient {
    /// Get a swap quote from Jupiter Aggregator V6
    pub async fn get_swap_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<QuoteResponse> {
        if amount == 0 {
            return Err(AppError::InvalidInput("Quote amount must be greater than 0".to_string()));
        }
        if input_mint == output_mint {
            return Err(AppError::InvalidInput("Input and output tokens must differ".to_string()));
        }

        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.api_base, input_mint, output_mint, amount, slippage_bps
        );

        debug!("Jupiter swap quote request: {}", url);
        self.throttle().await;

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Jupiter quote request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited("Jupiter quote API".to_string()));
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!("Jupiter quote failed: {}", error_text)));
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("Jupiter quote parse failed: {}", e)))?;

        debug!(
            "Jupiter quote: {} -> {} (impact: {:.4}%)",
            quote.in_amount, quote.out_amount, quote.price_impact_pct
        );

        Ok(quote)
    }
}
