//! # Core Abstractions
//!
//! Service traits at the seams between the application store and the
//! outside world (wallet app, Solana RPC, swap router).
//!
//! ## Dependency Injection
//!
//! ```rust,no_run
//! use dex_wallet::core::service::{NetworkService, WalletAdapter};
//! use std::sync::Arc;
//!
//! // In production: the RPC client
//! let network: Arc<dyn NetworkService> = Arc::new(lib_solana::SolanaClient::builder().build());
//! ```
//!
//! Errors are the workspace-wide [`lib_core::AppError`].

pub mod service;

pub use service::{NetworkService, SwapService, WalletAdapter};
