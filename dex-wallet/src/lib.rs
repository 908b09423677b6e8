//! # DEX Wallet - Library Root
//!
//! Headless session core of a Solana token-swap client. The binary crate
//! (`main.rs`) and any UI shell drive the types exported here.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 UI loop (any frontend)                   │
//! │      receives AppEvent over async_channel                │
//! └───────────────▲──────────────────────────┬───────────────┘
//!                 │ Navigate / SignInResult  │ actions
//! ┌───────────────┴────────────┐  ┌──────────▼───────────────┐
//! │  NavigationGuard           │  │  AuthGate                │
//! │  watch::Receiver<Session>  │  │  Mutation (pending/err)  │
//! └───────────────▲────────────┘  └──────────┬───────────────┘
//!                 │ publish                  │
//! ┌───────────────┴──────────────────────────▼───────────────┐
//! │  AppStore: SessionState, generation, notifications       │
//! └──────────┬───────────────────────────────┬───────────────┘
//!            │ WalletAdapter                 │ NetworkService
//! ┌──────────▼──────────────┐   ┌────────────▼───────────────┐
//! │ MobileWallet            │   │ lib_solana::SolanaClient   │
//! │ └ WalletTransport       │   │ (nonblocking RpcClient)    │
//! └─────────────────────────┘   └────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - **app**: store, auth gate, navigation guard, notifications
//! - **core**: service traits at the dependency-injection seams
//! - **services**: wallet authorization adapter and local keypair transport
//! - **debug**: logging setup and task tracking
//! - **utils**: persisted preferences

pub mod app;
pub mod core;
pub mod debug;
pub mod services;
pub mod utils;
