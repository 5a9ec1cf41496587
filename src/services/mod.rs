// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the session controller components.

pub mod backend;
pub mod controller;
pub mod events;
pub mod fallback;
pub mod navigation;
pub mod oauth;
pub mod resolver;
pub mod store;
pub mod terminator;

pub use backend::{AuthBackend, HttpAuthBackend, OAuthStartRequest, OAuthStartResponse};
pub use controller::AuthController;
pub use events::{AuthSignal, EventBridge};
pub use fallback::{LocalProfile, OfflineIdentityFallback};
pub use navigation::{ConsoleNavigator, Navigation, Navigator, RecordingNavigator};
pub use oauth::{OAuthInitiator, OAuthSettings};
pub use resolver::IdentityResolver;
pub use store::SessionStore;
pub use terminator::SessionTerminator;
