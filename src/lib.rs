// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Auth-Session: client-side authentication session controller
//!
//! This crate answers "who is the current user", drives OAuth sign-in and
//! sign-out, and keeps the application usable when the identity service is
//! unreachable by degrading to a locally persisted offline identity.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AuthError, ErrorCategory};
pub use models::{AuthPhase, Identity, SessionState, SignInMode};
pub use services::{AuthController, AuthSignal, EventBridge};
