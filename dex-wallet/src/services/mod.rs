//! # Services Module
//!
//! ```text
//! services/
//! ├── wallet.rs   - wallet authorization adapter over an external wallet app
//! └── keypair.rs  - local keypair transport (sign locally, send over RPC)
//! ```
//!
//! [`MobileWallet`] implements [`crate::core::WalletAdapter`] for any
//! [`WalletTransport`]; [`KeypairTransport`] is the transport used when no
//! external wallet is present.

pub mod keypair;
pub mod wallet;

pub use keypair::{keypair_from_base58, keypair_from_bytes, keypair_from_file, KeypairTransport};
pub use wallet::{Account, AppIdentity, MobileWallet, SignInPayload, WalletScope, WalletSession, WalletTransport};
