//! # Solana Library
//!
//! Solana blockchain integration: the RPC connection facade, SOL transfer
//! building, the Jupiter quote/swap client and the constant-product AMM quote.

// Declare all modules
pub mod amm;
pub mod client;
pub mod jupiter;
pub mod transfer;

// Re-export commonly used types from root for convenience
pub use amm::{constant_product_quote, SwapQuote};
pub use client::{SolanaClient, SolanaClientBuilder};
pub use jupiter::JupiterClient;
pub use transfer::transfer_transaction;
