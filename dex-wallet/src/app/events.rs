//! # Application Events
//!
//! Messages from background tasks to the UI loop.

use crate::app::state::Route;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Replace the current route
    Navigate(Route),
    /// Sign-in finished: address or user-facing error
    SignInResult(Result<String, String>),
    /// Long-running action started
    Loading(String),
}
