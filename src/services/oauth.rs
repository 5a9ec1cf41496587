// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth initiator: starts a sign-in or sign-up sequence.
//!
//! On success the navigator is handed the provider URL and the process is
//! expected to leave the page. When the identity service cannot start the
//! handshake, sign-in degrades to a freshly persisted offline identity
//! instead of surfacing an error.

use crate::error::{AuthError, ErrorCategory};
use crate::models::{AuthPhase, SessionPatch, SignInMode};
use crate::services::backend::{with_deadline, AuthBackend, OAuthStartRequest};
use crate::services::events::{AuthSignal, EventBridge};
use crate::services::fallback::OfflineIdentityFallback;
use crate::services::navigation::Navigator;
use crate::services::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Message stored in `SessionState::error` when no identity could be set up.
pub const SIGN_IN_FAILED_MESSAGE: &str = "Sign-in is unavailable right now. Please try again.";

/// Deadlines and provider settings for the initiator.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub provider: String,
    pub deadline: Duration,
    /// Pause before adopting the offline identity (pacing, not a retry)
    pub fallback_delay: Duration,
}

#[derive(Clone)]
pub struct OAuthInitiator {
    backend: Arc<dyn AuthBackend>,
    fallback: OfflineIdentityFallback,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    events: EventBridge,
    settings: OAuthSettings,
}

impl OAuthInitiator {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        fallback: OfflineIdentityFallback,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        events: EventBridge,
        settings: OAuthSettings,
    ) -> Self {
        Self {
            backend,
            fallback,
            store,
            navigator,
            events,
            settings,
        }
    }

    /// Begin an OAuth sequence.
    ///
    /// `Ok(true)` means the flow was initiated (redirect issued or offline
    /// identity adopted), never that the user is authenticated with the
    /// provider. `Err` only when the offline identity could not be created.
    pub async fn sign_in(&self, mode: SignInMode) -> Result<bool, AuthError> {
        self.store
            .apply(SessionPatch::begin(AuthPhase::SigningIn).with_error(None));

        let request = OAuthStartRequest {
            provider: self.settings.provider.clone(),
            mode,
        };

        let result = with_deadline(
            "oauth start",
            self.settings.deadline,
            self.backend.start_oauth(&request),
        )
        .await
        .and_then(|response| response.into_redirect());

        match result {
            Ok(redirect_url) => {
                tracing::info!(
                    provider = %request.provider,
                    mode = %mode,
                    "OAuth handshake started, redirecting"
                );
                self.navigator.navigate(&redirect_url);
                // Completion arrives later through the callback and an
                // auth-success signal; nothing is in flight here any more.
                let current = self.store.snapshot().identity;
                self.store.apply(SessionPatch::settle(current));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    failure = e.diagnostic(),
                    category = %e.category(),
                    mode = %mode,
                    "OAuth start failed, falling back to offline identity"
                );
                self.adopt_offline_identity(mode).await
            }
        }
    }

    async fn adopt_offline_identity(&self, mode: SignInMode) -> Result<bool, AuthError> {
        tokio::time::sleep(self.settings.fallback_delay).await;

        match self.fallback.create(mode).await {
            Ok(identity) => {
                self.store.apply(SessionPatch::settle(Some(identity)));
                self.events.publish(AuthSignal::OfflineFallback);
                Ok(true)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    failure = e.diagnostic(),
                    "Failed to create offline identity"
                );
                let error = AuthError::new(ErrorCategory::Auth, SIGN_IN_FAILED_MESSAGE);
                let current = self.store.snapshot().identity;
                self.store
                    .apply(SessionPatch::settle(current).with_error(Some(error.clone())));
                Err(error)
            }
        }
    }
}
