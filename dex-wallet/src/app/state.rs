//! # Application State Types
//!
//! The session value published by the store, and the routes the navigation
//! guard chooses between.

use lib_solana::client::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;

/// Connected wallet snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletInfo {
    pub public_key: Pubkey,
    /// Balance in SOL, derived from `lamports`
    pub balance: f64,
    pub lamports: u64,
}

impl WalletInfo {
    pub fn new(public_key: Pubkey, lamports: u64) -> Self {
        Self {
            public_key,
            balance: lamports_to_sol(lamports),
            lamports,
        }
    }

    /// Address in base58
    pub fn address(&self) -> String {
        self.public_key.to_string()
    }
}

/// Wallet session as seen by the rest of the app.
///
/// `Connecting` covers the wallet round-trip of a connect or sign-in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    Connecting,
    SignedIn(WalletInfo),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }

    pub fn wallet_info(&self) -> Option<&WalletInfo> {
        match self {
            SessionState::SignedIn(info) => Some(info),
            _ => None,
        }
    }
}

/// Tabs of the main surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Home,
    Portfolio,
    Search,
    Trading,
    Liquidity,
    Launchpad,
    Settings,
}

impl Tab {
    /// Get all tabs in tab bar order
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Home,
            Tab::Portfolio,
            Tab::Search,
            Tab::Trading,
            Tab::Liquidity,
            Tab::Launchpad,
            Tab::Settings,
        ]
    }

    /// Get tab title for the tab bar
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Portfolio => "Portfolio",
            Tab::Search => "Search",
            Tab::Trading => "Trading",
            Tab::Liquidity => "Liquidity",
            Tab::Launchpad => "Launchpad",
            Tab::Settings => "Settings",
        }
    }
}

/// Top-level routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    /// The main surface
    Tabs(Tab),
    Send,
    Receive,
    Swap,
    Welcome,
}

impl Route {
    /// Whether this route is part of the main (signed-in) surface.
    pub fn is_main_surface(&self) -> bool {
        matches!(self, Route::Tabs(_))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::SignIn => "Sign In",
            Route::Tabs(tab) => tab.title(),
            Route::Send => "Send",
            Route::Receive => "Receive",
            Route::Swap => "Swap",
            Route::Welcome => "Welcome",
        }
    }
}
