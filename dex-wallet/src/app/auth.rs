//! # Auth Gate
//!
//! "Is the user signed in" plus the sign-in / sign-out actions.
//!
//! `is_authenticated` is read from the store's session on every call, so it
//! cannot disagree with it. Sign-in goes through a [`Mutation`] so the UI can
//! show a spinner and the last error; a failed attempt is not retried.

use crate::app::events::AppEvent;
use crate::app::state::{SessionState, WalletInfo};
use crate::app::store::AppStore;
use crate::services::wallet::SignInPayload;
use async_channel::Sender;
use lib_core::{AppError, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MutationState {
    in_flight: usize,
    error: Option<AppError>,
}

/// Observable state of a single-attempt async action.
#[derive(Debug, Clone, Default)]
pub struct Mutation {
    state: Arc<Mutex<MutationState>>,
}

// Counts the run out even if the driving future is dropped mid-flight.
struct PendingGuard<'a>(&'a Mutex<MutationState>);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl Mutation {
    /// True while any run is still in flight.
    pub fn is_pending(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    pub fn is_error(&self) -> bool {
        self.state.lock().error.is_some()
    }

    /// Error of the last attempt, if it failed.
    pub fn error(&self) -> Option<AppError> {
        self.state.lock().error.clone()
    }

    /// Forget the last error. Runs still in flight keep counting.
    pub fn reset(&self) {
        self.state.lock().error = None;
    }

    /// Run `action` once, recording pending and error state around it.
    pub async fn run<T, F>(&self, action: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        {
            let mut state = self.state.lock();
            state.in_flight += 1;
            state.error = None;
        }
        let _pending = PendingGuard(&self.state);

        let result = action.await;
        if let Err(err) = &result {
            self.state.lock().error = Some(err.clone());
        }
        result
    }
}

/// Authentication front of the application store.
#[derive(Clone)]
pub struct AuthGate {
    store: AppStore,
    sign_in: Mutation,
}

impl AuthGate {
    pub fn new(store: AppStore) -> Self {
        Self {
            store,
            sign_in: Mutation::default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn session(&self) -> SessionState {
        self.store.session()
    }

    /// Observability of the sign-in action.
    pub fn sign_in_mutation(&self) -> &Mutation {
        &self.sign_in
    }

    /// One connect attempt.
    pub async fn sign_in(&self) -> Result<WalletInfo> {
        self.sign_in.run(self.store.connect_wallet()).await
    }

    /// One connect attempt with a sign-in message.
    pub async fn sign_in_with_payload(&self, payload: SignInPayload) -> Result<WalletInfo> {
        self.sign_in.run(self.store.connect_with_sign_in(payload)).await
    }

    /// Sign out. Never fails.
    pub async fn sign_out(&self) {
        self.store.disconnect_wallet().await;
    }

    /// Sign in on a background task and report the outcome over `events`.
    pub fn spawn_sign_in(&self, events: Sender<AppEvent>) {
        let gate = self.clone();
        crate::debug::spawn_tracked("sign_in", async move {
            let _ = events.send(AppEvent::Loading("Connecting wallet...".to_string())).await;
            let result = gate
                .sign_in()
                .await
                .map(|info| info.address())
                .map_err(|e| e.user_message());
            let _ = events.send(AppEvent::SignInResult(result)).await;
        });
    }
}
