//! # Jupiter API Types
//!
//! Type definitions for Jupiter Aggregator API responses.

use serde::{Deserialize, Serialize};

/// Token information from Jupiter token list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response from Jupiter quote API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "otherAmountThreshold", default)]
    pub other_amount_threshold: Option<String>,
    #[serde(rename = "slippageBps", default)]
    pub slippage_bps: u16,
    #[serde(
        rename = "priceImpactPct",
        deserialize_with = "de_number_or_string",
        serialize_with = "ser_as_string"
    )]
    pub price_impact_pct: f64,
    #[serde(rename = "routePlan")]
    pub route_plan: Vec<RoutePlanStep>,
}

impl QuoteResponse {
    /// Output amount in base units, if the API returned a valid integer.
    pub fn out_amount_u64(&self) -> Option<u64> {
        self.out_amount.parse().ok()
    }
}

/// A step in Jupiter's routing plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanStep {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
    #[serde(default)]
    pub percent: Option<u8>,
}

/// Details about a single swap operation within a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: String,
    pub label: Option<String>,
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "feeAmount")]
    pub fee_amount: String,
    #[serde(rename = "feeMint")]
    pub fee_mint: String,
}

/// Response from Jupiter swap API
#[derive(Debug, Serialize, Deserialize)]
pub struct SwapTransactionResponse {
    /// Base64-encoded serialized versioned transaction
    #[serde(rename = "swapTransaction")]
    pub swap_transaction: String,
    /// Block height after which transaction is invalid
    #[serde(rename = "lastValidBlockHeight")]
    pub last_valid_block_height: u64,
    /// Optional priority fee in lamports
    #[serde(rename = "prioritizationFeeLamports")]
    pub prioritization_fee_lamports: Option<u64>,
}

// v6 sends priceImpactPct as a decimal string; older payloads used a number.
fn de_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn ser_as_string<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}
