// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offline identity fallback.
//!
//! A placeholder identity persisted in durable storage when a sign-in could
//! not reach the identity service. The id is derived from the local account
//! and host names, so repeated fallbacks on one machine yield the same user.
//! Nothing in here performs network I/O.

use crate::db::{self, keys, DurableStorage};
use crate::error::Result;
use crate::models::{Identity, OfflineIdentity, SignInMode};
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Prefix marking identities that never came from the identity service.
pub const OFFLINE_ID_PREFIX: &str = "offline-";

const OFFLINE_EMAIL_DOMAIN: &str = "offline.local";

/// Local account details used to build the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProfile {
    pub username: String,
    pub real_name: String,
    pub hostname: String,
}

impl LocalProfile {
    /// Best-effort lookup of the current OS account.
    pub fn detect() -> Self {
        Self {
            username: whoami::username(),
            real_name: whoami::realname(),
            hostname: whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string()),
        }
    }
}

/// Whether `identity` is an offline placeholder.
pub fn is_offline_identity(identity: &Identity) -> bool {
    identity.id.starts_with(OFFLINE_ID_PREFIX)
}

#[derive(Clone)]
pub struct OfflineIdentityFallback {
    storage: Arc<dyn DurableStorage>,
    profile: LocalProfile,
}

impl OfflineIdentityFallback {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self::with_profile(storage, LocalProfile::detect())
    }

    pub fn with_profile(storage: Arc<dyn DurableStorage>, profile: LocalProfile) -> Self {
        Self { storage, profile }
    }

    /// Build the placeholder identity without persisting it.
    pub fn placeholder(&self) -> Identity {
        let username = sanitize_username(&self.profile.username);

        let mut hasher = Sha256::new();
        hasher.update(username.as_bytes());
        hasher.update(b"@");
        hasher.update(self.profile.hostname.trim().to_lowercase().as_bytes());
        let digest = hex::encode(hasher.finalize());

        let mut names = self.profile.real_name.split_whitespace();
        let (given_name, family_name) = match names.next() {
            Some(first) => (first.to_string(), names.collect::<Vec<_>>().join(" ")),
            None => (username.clone(), String::new()),
        };

        Identity {
            id: format!("{}{}", OFFLINE_ID_PREFIX, &digest[..16]),
            email: format!("{}@{}", username, OFFLINE_EMAIL_DOMAIN),
            given_name,
            family_name,
            avatar_url: None,
        }
    }

    /// Build, persist and return a fresh offline identity.
    pub async fn create(&self, mode: SignInMode) -> Result<Identity> {
        let record = OfflineIdentity {
            identity: self.placeholder(),
            mode,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        db::set_json(self.storage.as_ref(), keys::OFFLINE_IDENTITY, &record).await?;

        tracing::info!(
            identity_id = %record.identity.id,
            mode = %mode,
            "Offline identity persisted"
        );
        Ok(record.identity)
    }

    /// Persisted offline identity, if any.
    pub async fn load(&self) -> Result<Option<OfflineIdentity>> {
        db::get_json(self.storage.as_ref(), keys::OFFLINE_IDENTITY).await
    }

    /// Delete the persisted record. Returns whether one existed.
    pub async fn clear(&self) -> Result<bool> {
        let removed = self.storage.delete(keys::OFFLINE_IDENTITY).await?;
        if removed {
            tracing::info!("Offline identity deleted");
        }
        Ok(removed)
    }
}

fn sanitize_username(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}
