// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the session controller.

pub mod identity;
pub mod session;

pub use identity::{Identity, OfflineIdentity, SignInMode};
pub use session::{AuthPhase, SessionPatch, SessionState};
