//! # Core Library
//!
//! Static configuration and the shared error taxonomy for the wallet client.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Config, NetworkConfig, NETWORK_CONFIG};
pub use error::{AppError, Result};
