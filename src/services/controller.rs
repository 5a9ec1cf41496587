// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth controller: the root object consumers hold.
//!
//! Wires the session store, resolver, initiator, terminator and event
//! bridge together and exposes the consumer contract:
//! - `initialize()` / `refresh()` for identity resolution
//! - `sign_in(mode)` / `sign_out()` for user actions
//! - `clear_error()`
//! - `state()` / `subscribe()` to read the session
//!
//! Each operation family is gated by its own mutex so at most one instance
//! runs at a time; callers arriving while one is in flight share its
//! outcome instead of starting another. Across families, `op_gate` runs
//! resolution, sign-in and sign-out strictly one after another, so a
//! resolution can never settle over the result of a sign-in or sign-out
//! that finished while it was in flight.
//!
//! Lock order is always family gate, then `op_gate`.

use crate::config::Config;
use crate::db::{DurableStorage, FileStorage};
use crate::error::{AuthError, Result};
use crate::models::{SessionPatch, SessionState, SignInMode};
use crate::services::backend::{AuthBackend, HttpAuthBackend};
use crate::services::events::{AuthSignal, EventBridge};
use crate::services::fallback::OfflineIdentityFallback;
use crate::services::navigation::{ConsoleNavigator, Navigator};
use crate::services::oauth::{OAuthInitiator, OAuthSettings};
use crate::services::resolver::IdentityResolver;
use crate::services::store::SessionStore;
use crate::services::terminator::SessionTerminator;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub struct AuthController {
    store: SessionStore,
    events: EventBridge,
    resolver: IdentityResolver,
    oauth: OAuthInitiator,
    terminator: SessionTerminator,
    /// Serializes identity resolution (initialize and refresh).
    resolve_gate: Mutex<()>,
    sign_in_gate: Mutex<()>,
    sign_out_gate: Mutex<()>,
    /// Held while any operation mutates the session.
    op_gate: Mutex<()>,
}

impl AuthController {
    /// Create a controller with the offline fallback built from the local
    /// OS account and a private event bridge.
    pub fn new(
        config: &Config,
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn DurableStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_parts(
            config,
            backend,
            OfflineIdentityFallback::new(storage),
            navigator,
            EventBridge::default(),
        )
    }

    /// Create a controller from explicitly constructed collaborators.
    pub fn with_parts(
        config: &Config,
        backend: Arc<dyn AuthBackend>,
        fallback: OfflineIdentityFallback,
        navigator: Arc<dyn Navigator>,
        events: EventBridge,
    ) -> Self {
        let store = SessionStore::new();

        let resolver = IdentityResolver::new(
            backend.clone(),
            fallback.clone(),
            store.clone(),
            config.resolve_timeout,
        );

        let oauth = OAuthInitiator::new(
            backend.clone(),
            fallback.clone(),
            store.clone(),
            navigator.clone(),
            events.clone(),
            OAuthSettings {
                provider: config.oauth_provider.clone(),
                deadline: config.oauth_timeout,
                fallback_delay: config.fallback_delay,
            },
        );

        let terminator = SessionTerminator::new(
            backend,
            fallback,
            store.clone(),
            navigator,
            events.clone(),
            config.logout_timeout,
            config.app_root_url.clone(),
        );

        Self {
            store,
            events,
            resolver,
            oauth,
            terminator,
            resolve_gate: Mutex::new(()),
            sign_in_gate: Mutex::new(()),
            sign_out_gate: Mutex::new(()),
            op_gate: Mutex::new(()),
        }
    }

    /// Production wiring: HTTP backend, file storage, console navigator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = HttpAuthBackend::new(config.api_base_url.clone())?;
        let storage = FileStorage::new(config.storage_path.clone());

        tracing::info!(
            api = %config.api_base_url,
            storage = %config.storage_path.display(),
            "Auth controller configured"
        );

        Ok(Self::new(
            config,
            Arc::new(backend),
            Arc::new(storage),
            Arc::new(ConsoleNavigator),
        ))
    }

    // ─── Resolution ──────────────────────────────────────────────────────

    /// Resolve the identity once per process.
    ///
    /// Returns the cached state if already initialized. Concurrent callers
    /// wait for the single in-flight resolution.
    pub async fn initialize(&self) -> SessionState {
        if self.store.is_initialized() {
            return self.store.snapshot();
        }

        let _guard = self.resolve_gate.lock().await;

        // Another caller may have finished while we waited.
        if self.store.is_initialized() {
            return self.store.snapshot();
        }

        let _op = self.op_gate.lock().await;
        self.resolver.resolve().await
    }

    /// Re-resolve the identity.
    ///
    /// If a resolution is already in flight, waits for it and returns its
    /// result rather than starting a second one.
    pub async fn refresh(&self) -> SessionState {
        match self.resolve_gate.try_lock() {
            Ok(_guard) => {
                let _op = self.op_gate.lock().await;
                self.resolver.resolve().await
            }
            Err(_) => {
                tracing::debug!("Resolution already in flight, waiting for it");
                let _guard = self.resolve_gate.lock().await;
                self.store.snapshot()
            }
        }
    }

    // ─── User actions ────────────────────────────────────────────────────

    /// Start a sign-in or sign-up flow. See [`OAuthInitiator::sign_in`].
    pub async fn sign_in(&self, mode: SignInMode) -> std::result::Result<bool, AuthError> {
        let Ok(_guard) = self.sign_in_gate.try_lock() else {
            tracing::debug!(mode = %mode, "Sign-in already in flight");
            return Ok(true);
        };
        let _op = self.op_gate.lock().await;
        self.oauth.sign_in(mode).await
    }

    /// Sign out locally and remotely. Always ends with no identity.
    pub async fn sign_out(&self) -> SessionState {
        match self.sign_out_gate.try_lock() {
            Ok(_guard) => {
                let _op = self.op_gate.lock().await;
                self.terminator.sign_out().await
            }
            Err(_) => {
                tracing::debug!("Sign-out already in flight, waiting for it");
                let _guard = self.sign_out_gate.lock().await;
                self.store.snapshot()
            }
        }
    }

    pub fn clear_error(&self) {
        self.store.apply(SessionPatch::default().with_error(None));
    }

    // ─── State access ────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub fn events(&self) -> &EventBridge {
        &self.events
    }

    /// Listen for `auth-success` / `auth-refresh` and re-resolve on each.
    ///
    /// The listener holds only a weak reference, so it ends once the
    /// controller and every clone of its event bridge are gone.
    pub fn spawn_signal_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::downgrade(self);
        self.events.on_any(
            |signal: AuthSignal| signal.triggers_resolution(),
            move |signal| {
                let controller = controller.clone();
                async move {
                    if let Some(controller) = controller.upgrade() {
                        tracing::debug!(signal = %signal, "Re-resolving identity on signal");
                        controller.refresh().await;
                    }
                }
            },
        )
    }
}
