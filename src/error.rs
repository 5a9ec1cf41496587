// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the session controller.
//!
//! `AppError` carries internal failures with enough detail to log a
//! diagnostic classification. `AuthError` is the small value consumers see
//! in `SessionState::error`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Consumer-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Timeout or connection failure.
    Network,
    /// Non-2xx response from the identity service.
    Server,
    /// Explicit rejection, or failure to establish any identity.
    Auth,
    /// Malformed response.
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// Error surfaced to consumers through the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    pub category: ErrorCategory,
}

impl AuthError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }
}

/// Internal failure type used across the backend, storage and controller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Identity service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("OAuth start response did not include a redirect URL")]
    MissingRedirect,

    #[error("OAuth start rejected: {0}")]
    OAuthRejected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Category this failure maps to in the consumer-facing taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Timeout { .. } | AppError::ConnectionRefused(_) | AppError::Network(_) => {
                ErrorCategory::Network
            }
            AppError::Status(_) => ErrorCategory::Server,
            AppError::OAuthRejected(_) => ErrorCategory::Auth,
            AppError::InvalidResponse(_) | AppError::MissingRedirect => ErrorCategory::Validation,
            AppError::Storage(_) | AppError::Internal(_) => ErrorCategory::Auth,
        }
    }

    /// Short label used as the `failure` field in diagnostic logs.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            AppError::Timeout { .. } => "timeout",
            AppError::ConnectionRefused(_) => "connection_refused",
            AppError::Network(_) => "network_failure",
            AppError::Status(503) => "service_unavailable",
            AppError::Status(code) if *code >= 500 => "server_error",
            AppError::Status(_) => "unexpected_status",
            AppError::InvalidResponse(_) => "invalid_response",
            AppError::MissingRedirect => "missing_redirect",
            AppError::OAuthRejected(_) => "oauth_rejected",
            AppError::Storage(_) => "storage_failure",
            AppError::Internal(_) => "internal",
        }
    }

    /// Map a transport error from `reqwest` into the taxonomy.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Network(format!("request timed out: {}", err))
        } else if err.is_connect() {
            AppError::ConnectionRefused(err.to_string())
        } else if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(err.to_string())
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
