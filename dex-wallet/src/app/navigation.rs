//! # Navigation Guard
//!
//! Keeps the visible route consistent with the session:
//!
//! | Session     | Route               | Redirect     |
//! |-------------|---------------------|--------------|
//! | SignedOut   | anything but SignIn | `SignIn`     |
//! | SignedIn    | anything but Tabs   | `Tabs(Home)` |
//! | Connecting  | Tabs                | `SignIn`     |
//! | Connecting  | anything else       | none         |
//!
//! Holding the route while connecting avoids a sign-in flash during the
//! wallet round-trip. The main surface is never shown without a session.

use crate::app::events::AppEvent;
use crate::app::state::{Route, SessionState, Tab};
use async_channel::Sender;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// The part of the session the guard cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    SignedOut,
    Connecting,
    SignedIn,
}

impl From<&SessionState> for NavState {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::SignedOut => NavState::SignedOut,
            SessionState::Connecting => NavState::Connecting,
            SessionState::SignedIn(_) => NavState::SignedIn,
        }
    }
}

/// Where to go from `route` in `state`, or `None` to stay.
pub fn evaluate(state: NavState, route: Route) -> Option<Route> {
    match state {
        NavState::SignedOut if route != Route::SignIn => Some(Route::SignIn),
        NavState::SignedIn if !route.is_main_surface() => Some(Route::Tabs(Tab::Home)),
        NavState::Connecting if route.is_main_surface() => Some(Route::SignIn),
        _ => None,
    }
}

/// Reacts to session and route changes and emits `AppEvent::Navigate`.
pub struct NavigationGuard {
    session: watch::Receiver<SessionState>,
    routes: watch::Receiver<Route>,
    events: Sender<AppEvent>,
}

impl NavigationGuard {
    /// `routes` carries the route the UI currently shows.
    pub fn new(
        session: watch::Receiver<SessionState>,
        routes: watch::Receiver<Route>,
        events: Sender<AppEvent>,
    ) -> Self {
        Self { session, routes, events }
    }

    /// Run until the store, the UI route channel or the event receiver goes away.
    pub async fn run(mut self) {
        let mut current = *self.routes.borrow_and_update();

        loop {
            let state = NavState::from(&*self.session.borrow_and_update());
            if let Some(target) = evaluate(state, current) {
                debug!(from = ?current, to = ?target, ?state, "Navigation redirect");
                if self.events.send(AppEvent::Navigate(target)).await.is_err() {
                    break;
                }
                current = target;
            }

            tokio::select! {
                changed = self.session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.routes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    current = *self.routes.borrow_and_update();
                }
            }
        }

        debug!("Navigation guard stopped");
    }

    pub fn spawn(self) -> JoinHandle<()> {
        crate::debug::spawn_tracked("navigation_guard", self.run())
    }
}
