//! # Notification Store
//!
//! In-memory list of user-facing notifications (trade confirmations,
//! airdrops, connection warnings). Lives as long as the process.

use chrono::{DateTime, Utc};
use lib_utils::time::{format_time_ago, now_utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Transaction,
    Trade,
    Airdrop,
    PriceAlert,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    /// Relative age for display ("5m ago").
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        format_time_ago(self.timestamp, now)
    }
}

/// Notification manager for the application
#[derive(Debug, Default)]
pub struct NotificationStore {
    // oldest first; `list` reverses
    items: RwLock<Vec<Notification>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unread notification and return its id.
    pub fn push(&self, kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: now_utc(),
            read: false,
        };
        let id = notification.id;

        tracing::debug!(%id, ?kind, title = %notification.title, "Notification pushed");
        self.items.write().push(notification);
        id
    }

    /// All notifications, newest first.
    pub fn list(&self) -> Vec<Notification> {
        self.items.read().iter().rev().cloned().collect()
    }

    /// Returns false when `id` is unknown.
    pub fn mark_read(&self, id: Uuid) -> bool {
        match self.items.write().iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&self) {
        for notification in self.items.write().iter_mut() {
            notification.read = true;
        }
    }

    /// Returns false when `id` is unknown.
    pub fn delete(&self, id: Uuid) -> bool {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }

    pub fn unread_count(&self) -> usize {
        self.items.read().iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
