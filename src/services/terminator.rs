// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session terminator.
//!
//! Sign-out always succeeds locally. The persisted offline identity is
//! removed before the remote logout is attempted.

use crate::models::{AuthPhase, SessionPatch, SessionState};
use crate::services::backend::{with_deadline, AuthBackend};
use crate::services::events::{AuthSignal, EventBridge};
use crate::services::fallback::OfflineIdentityFallback;
use crate::services::navigation::Navigator;
use crate::services::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct SessionTerminator {
    backend: Arc<dyn AuthBackend>,
    fallback: OfflineIdentityFallback,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    events: EventBridge,
    deadline: Duration,
    root_url: String,
}

impl SessionTerminator {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        fallback: OfflineIdentityFallback,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        events: EventBridge,
        deadline: Duration,
        root_url: String,
    ) -> Self {
        Self {
            backend,
            fallback,
            store,
            navigator,
            events,
            deadline,
            root_url,
        }
    }

    pub async fn sign_out(&self) -> SessionState {
        self.store.apply(SessionPatch::begin(AuthPhase::SigningOut));

        // 1. Local fallback first
        if let Err(e) = self.fallback.clear().await {
            tracing::warn!(
                error = %e,
                failure = e.diagnostic(),
                "Failed to delete offline identity, continuing sign-out"
            );
        }

        // 2. Best-effort remote logout
        match with_deadline("logout", self.deadline, self.backend.logout()).await {
            Ok(()) => tracing::info!("Remote session ended"),
            Err(e) => tracing::warn!(
                error = %e,
                failure = e.diagnostic(),
                "Remote logout failed, signing out locally"
            ),
        }

        // 3. Local reset
        let state = self.store.apply(SessionPatch::settle(None));
        self.events.publish(AuthSignal::SignedOut);
        self.navigator.reset_to_root(&self.root_url);
        state
    }
}
