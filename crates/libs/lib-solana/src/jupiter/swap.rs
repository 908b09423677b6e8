//! # Jupiter Swap Transaction Building
//!
//! Swap transaction building from Jupiter quotes.

use super::client::JupiterHttpClient;
use super::types::{QuoteResponse, SwapTransactionResponse};
use lib_core::{AppError, Result};
use solana_sdk::transaction::VersionedTransaction;
use tracing::debug;

impl JupiterHttpClient {
    /// Build an unsigned swap transaction from a quote
    pub async fn get_swap_transaction(
        &self,
        quote_response: &QuoteResponse,
        user_public_key: &str,
    ) -> Result<SwapTransactionResponse> {
        let swap_url = format!("{}/swap", self.api_base);

        let request_body = serde_json::json!({
            "quoteResponse": quote_response,
            "userPublicKey": user_public_key,
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true,
            "prioritizationFeeLamports": "auto",
        });

        debug!("Jupiter swap transaction request for user: {}", user_public_key);
        self.throttle().await;

        let response = self
            .http
            .post(&swap_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Jupiter swap request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!("Jupiter swap transaction failed: {}", error_text)));
        }

        let swap_response: SwapTransactionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("Jupiter swap parse failed: {}", e)))?;

        debug!("Jupiter swap transaction received");

        Ok(swap_response)
    }
}

/// Decode the base64 transaction returned by the swap endpoint.
pub fn decode_swap_transaction(response: &SwapTransactionResponse) -> Result<VersionedTransaction> {
    let bytes = lib_utils::b64_decode(&response.swap_transaction)
        .map_err(|e| AppError::Decoding(format!("Swap transaction is not base64: {}", e)))?;

    bincode::deserialize(&bytes)
        .map_err(|e| AppError::Decoding(format!("Swap transaction is not a valid transaction: {}", e)))
}
