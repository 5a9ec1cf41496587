//! Session store: the single source of truth for authentication state.
//!
//! Backed by a `watch` channel so subscribers always observe the latest
//! snapshot and are woken on every effective change.

use crate::models::{SessionPatch, SessionState};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Merge `patch` into the state and notify subscribers if it changed.
    pub fn apply(&self, patch: SessionPatch) -> SessionState {
        self.tx.send_if_modified(|state| patch.apply_to(state));
        self.snapshot()
    }

    pub fn is_initialized(&self) -> bool {
        self.tx.borrow().initialized
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
