// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity service client.
//!
//! Handles:
//! - The "who am I" identity query
//! - Starting an OAuth handshake
//! - Best-effort logout
//!
//! Deadlines are not applied here; callers wrap each call with
//! [`with_deadline`] so a backend that never answers is still cut off.

use crate::error::{AppError, Result};
use crate::models::{Identity, SignInMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Endpoint paths relative to the API base URL.
pub mod paths {
    pub const ME: &str = "/api/auth/me";
    pub const OAUTH_START: &str = "/api/auth/oauth/start";
    pub const LOGOUT: &str = "/api/auth/logout";
}

/// Body of the OAuth start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthStartRequest {
    pub provider: String,
    pub mode: SignInMode,
}

/// OAuth start response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStartResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OAuthStartResponse {
    /// Redirect target, if the handshake actually started.
    pub fn into_redirect(self) -> Result<String> {
        if !self.success {
            return Err(AppError::OAuthRejected(
                self.error.unwrap_or_else(|| "unspecified".to_string()),
            ));
        }
        match self.redirect_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(AppError::MissingRedirect),
        }
    }
}

/// Remote identity service used by the controller.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Query the current identity. `Ok(None)` means the service explicitly
    /// answered "not signed in" (HTTP 401).
    async fn current_identity(&self) -> Result<Option<Identity>>;

    /// Ask the service to start an OAuth handshake.
    async fn start_oauth(&self, request: &OAuthStartRequest) -> Result<OAuthStartResponse>;

    /// End the remote session.
    async fn logout(&self) -> Result<()>;
}

/// Bound `fut` by `limit`. On expiry the future is dropped, abandoning the
/// in-flight request.
pub async fn with_deadline<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout {
            operation,
            after: limit,
        }),
    }
}

/// `AuthBackend` over HTTP.
#[derive(Clone)]
pub struct HttpAuthBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    /// Create a client for the identity service at `base_url`.
    ///
    /// Session cookies set by the service are kept for later requests.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        let response = self
            .http
            .get(self.url(paths::ME))
            .send()
            .await
            .map_err(AppError::from_transport)?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(AppError::from_transport)?;
        let identity: Identity = serde_json::from_slice(&body)?;
        Ok(Some(identity))
    }

    async fn start_oauth(&self, request: &OAuthStartRequest) -> Result<OAuthStartResponse> {
        let response = self
            .http
            .post(self.url(paths::OAUTH_START))
            .json(request)
            .send()
            .await
            .map_err(AppError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = %status, body = %body, "OAuth start returned error status");
            return Err(AppError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(AppError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn logout(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url(paths::LOGOUT))
            .send()
            .await
            .map_err(AppError::from_transport)?;

        if !response.status().is_success() {
            return Err(AppError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
