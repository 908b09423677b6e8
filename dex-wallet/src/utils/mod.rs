//! # Utility Functions
//!
//! - **[`prefs`]**: persisted user preferences

pub mod prefs;

pub use prefs::Prefs;
