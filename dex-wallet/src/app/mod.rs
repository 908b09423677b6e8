//! # Application Layer
//!
//! ```text
//! AppStore ──watch──▶ NavigationGuard ──AppEvent::Navigate──▶ UI
//!    ▲
//!    └── AuthGate (sign in / sign out)
//! ```
//!
//! The store owns the session; everything else reads it. Background tasks
//! report to the UI over an unbounded `async_channel` of [`AppEvent`]s.

pub mod auth;
pub mod events;
pub mod navigation;
pub mod notifications;
pub mod state;
pub mod store;

pub use auth::{AuthGate, Mutation};
pub use events::AppEvent;
pub use navigation::{evaluate, NavState, NavigationGuard};
pub use notifications::{Notification, NotificationKind, NotificationStore};
pub use state::{Route, SessionState, Tab, WalletInfo};
pub use store::AppStore;
