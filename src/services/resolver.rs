// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolver: the bounded "who am I" check.
//!
//! Resolution never surfaces an error. Every failure degrades to an
//! unauthenticated state plus a diagnostic log line, so the application
//! stays usable without a session.
//!
//! A persisted offline identity always wins over the network, and passive
//! resolution never fabricates a new one.

use crate::models::{AuthPhase, Identity, SessionPatch, SessionState};
use crate::services::backend::{with_deadline, AuthBackend};
use crate::services::fallback::OfflineIdentityFallback;
use crate::services::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionSource {
    /// Adopted from the persisted offline identity (no network call)
    OfflineFallback,
    /// Returned by the identity service
    Remote,
    /// Service answered "not signed in"
    Unauthenticated,
    /// Service unreachable or misbehaving; degraded to no identity
    Degraded,
}

#[derive(Clone)]
pub struct IdentityResolver {
    backend: Arc<dyn AuthBackend>,
    fallback: OfflineIdentityFallback,
    store: SessionStore,
    deadline: Duration,
}

impl IdentityResolver {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        fallback: OfflineIdentityFallback,
        store: SessionStore,
        deadline: Duration,
    ) -> Self {
        Self {
            backend,
            fallback,
            store,
            deadline,
        }
    }

    /// Resolve the current identity and publish it to the store.
    ///
    /// Always finishes with `initialized = true` and `loading = false`.
    pub async fn resolve(&self) -> SessionState {
        self.store.apply(SessionPatch::begin(AuthPhase::Resolving));

        let (identity, source) = self.lookup().await;

        tracing::debug!(
            source = ?source,
            identity_id = identity.as_ref().map(|i| i.id.as_str()).unwrap_or("none"),
            "Identity resolved"
        );

        self.store
            .apply(SessionPatch::settle(identity).with_initialized())
    }

    async fn lookup(&self) -> (Option<Identity>, ResolutionSource) {
        // ─── Persisted fallback first (no network) ───────────────────────
        match self.fallback.load().await {
            Ok(Some(record)) => {
                tracing::info!(
                    identity_id = %record.identity.id,
                    created_at = %record.created_at,
                    "Using persisted offline identity"
                );
                return (Some(record.identity), ResolutionSource::OfflineFallback);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    failure = e.diagnostic(),
                    "Failed to read offline identity, querying identity service"
                );
            }
        }

        // ─── Bounded identity query ──────────────────────────────────────
        let result = with_deadline(
            "identity query",
            self.deadline,
            self.backend.current_identity(),
        )
        .await;

        match result {
            Ok(Some(identity)) => (Some(identity), ResolutionSource::Remote),
            Ok(None) => {
                tracing::debug!("Identity service reports no session");
                (None, ResolutionSource::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    failure = e.diagnostic(),
                    category = %e.category(),
                    "Identity service unavailable, continuing unauthenticated"
                );
                (None, ResolutionSource::Degraded)
            }
        }
    }
}
