//! # Utilities Library
//!
//! Shared utility functions for base64 encoding, environment variables, time, and validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::{b64_decode, b64_encode};
pub use envs::{get_env, get_env_flag, get_env_parse};
pub use time::{format_time, format_time_ago, now_utc, parse_utc};
pub use validation::{validate_base58_address, validate_not_empty, validate_single_line};
