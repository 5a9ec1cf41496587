//! Session state held by the session store.

use serde::Serialize;

use crate::error::AuthError;
use crate::models::Identity;

/// Position in the authentication state machine.
///
/// `Resolving`, `SigningIn` and `SigningOut` are transient and are the only
/// phases in which `loading` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Uninitialized,
    Resolving,
    Authenticated,
    Unauthenticated,
    SigningIn,
    SigningOut,
}

impl AuthPhase {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthPhase::Resolving | AuthPhase::SigningIn | AuthPhase::SigningOut
        )
    }

    /// Settled phase for the given identity.
    pub fn settled(identity: Option<&Identity>) -> Self {
        if identity.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        }
    }
}

/// Snapshot of the current authentication state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
    pub initialized: bool,
    pub error: Option<AuthError>,
    pub phase: AuthPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            loading: false,
            initialized: false,
            error: None,
            phase: AuthPhase::Uninitialized,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Partial update merged into the state by the session store.
///
/// `None` leaves a field untouched. For the nullable fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub identity: Option<Option<Identity>>,
    pub loading: Option<bool>,
    pub initialized: Option<bool>,
    pub error: Option<Option<AuthError>>,
    pub phase: Option<AuthPhase>,
}

impl SessionPatch {
    /// Enter a transient phase.
    pub fn begin(phase: AuthPhase) -> Self {
        Self {
            loading: Some(true),
            phase: Some(phase),
            ..Default::default()
        }
    }

    /// Leave the transient phase with the given identity.
    pub fn settle(identity: Option<Identity>) -> Self {
        Self {
            phase: Some(AuthPhase::settled(identity.as_ref())),
            identity: Some(identity),
            loading: Some(false),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, error: Option<AuthError>) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_initialized(mut self) -> Self {
        self.initialized = Some(true);
        self
    }

    /// Merge into `state`. Returns whether anything changed.
    pub fn apply_to(self, state: &mut SessionState) -> bool {
        let before = state.clone();

        if let Some(identity) = self.identity {
            state.identity = identity;
        }
        if let Some(loading) = self.loading {
            state.loading = loading;
        }
        // initialized never reverts
        if self.initialized == Some(true) {
            state.initialized = true;
        }
        if let Some(error) = self.error {
            state.error = error;
        }
        if let Some(phase) = self.phase {
            state.phase = phase;
        }

        *state != before
    }
}
