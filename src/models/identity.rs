//! Identity model as returned by the identity service and as persisted for
//! the offline fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The resolved user. Replaced wholesale on change, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier
    pub id: String,
    pub email: String,
    #[serde(alias = "givenName", alias = "firstName")]
    pub given_name: String,
    #[serde(alias = "familyName", alias = "lastName")]
    pub family_name: String,
    /// Profile picture URL
    #[serde(
        default,
        alias = "avatarUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Name suitable for display, skipping empty parts.
    pub fn display_name(&self) -> String {
        [self.given_name.trim(), self.family_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which OAuth sequence the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMode {
    SignIn,
    SignUp,
}

impl SignInMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInMode::SignIn => "signin",
            SignInMode::SignUp => "signup",
        }
    }
}

impl fmt::Display for SignInMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignInMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signin" | "sign-in" => Ok(SignInMode::SignIn),
            "signup" | "sign-up" => Ok(SignInMode::SignUp),
            other => Err(format!("unknown sign-in mode: {}", other)),
        }
    }
}

/// Placeholder identity persisted in durable storage when the OAuth start
/// sequence could not reach the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineIdentity {
    pub identity: Identity,
    /// Mode of the sign-in attempt that created this record
    pub mode: SignInMode,
    /// When the record was created (RFC 3339, UTC)
    pub created_at: String,
}
