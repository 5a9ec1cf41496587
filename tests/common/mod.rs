// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use auth_session::config::Config;
use auth_session::db::{keys, DurableStorage, MemoryStorage};
use auth_session::error::{AppError, Result};
use auth_session::models::Identity;
use auth_session::services::{
    AuthBackend, AuthController, EventBridge, LocalProfile, OAuthStartRequest,
    OAuthStartResponse, OfflineIdentityFallback, RecordingNavigator,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Long enough to blow every test deadline.
pub const HANG: Duration = Duration::from_secs(30);

/// Config with short deadlines so timeout tests stay fast.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        resolve_timeout: Duration::from_millis(150),
        oauth_timeout: Duration::from_millis(150),
        logout_timeout: Duration::from_millis(150),
        fallback_delay: Duration::from_millis(20),
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn test_profile() -> LocalProfile {
    LocalProfile {
        username: "ada".to_string(),
        real_name: "Ada Lovelace".to_string(),
        hostname: "analytical-engine".to_string(),
    }
}

#[allow(dead_code)]
pub fn remote_identity() -> Identity {
    Identity {
        id: "user-42".to_string(),
        email: "ada@example.com".to_string(),
        given_name: "Ada".to_string(),
        family_name: "Lovelace".to_string(),
        avatar_url: Some("https://example.com/ada.png".to_string()),
    }
}

// ─── Scripted backend ────────────────────────────────────────────────────

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum MeReply {
    Identity(Identity),
    Unauthorized,
    Status(u16),
    Refused,
    Malformed,
    Hang,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum OAuthReply {
    Redirect(String),
    Status(u16),
    MissingRedirect,
    Rejected(String),
    Refused,
    Hang,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum LogoutReply {
    Ok,
    Status(u16),
    Refused,
    Hang,
}

/// In-process backend with canned replies and call accounting.
#[allow(dead_code)]
pub struct ScriptedBackend {
    me: Mutex<MeReply>,
    oauth: Mutex<OAuthReply>,
    logout: Mutex<LogoutReply>,
    /// Artificial latency on the identity query
    me_latency: Duration,
    me_calls: AtomicUsize,
    oauth_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    me_in_flight: AtomicUsize,
    me_max_in_flight: AtomicUsize,
    oauth_requests: Mutex<Vec<OAuthStartRequest>>,
    /// Storage inspected when logout is called
    observed_storage: Mutex<Option<MemoryStorage>>,
    offline_present_at_logout: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(me: MeReply) -> Self {
        Self {
            me: Mutex::new(me),
            oauth: Mutex::new(OAuthReply::Refused),
            logout: Mutex::new(LogoutReply::Ok),
            me_latency: Duration::ZERO,
            me_calls: AtomicUsize::new(0),
            oauth_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            me_in_flight: AtomicUsize::new(0),
            me_max_in_flight: AtomicUsize::new(0),
            oauth_requests: Mutex::new(Vec::new()),
            observed_storage: Mutex::new(None),
            offline_present_at_logout: Mutex::new(Vec::new()),
        }
    }

    pub fn with_oauth(self, reply: OAuthReply) -> Self {
        *self.oauth.lock().unwrap() = reply;
        self
    }

    pub fn with_logout(self, reply: LogoutReply) -> Self {
        *self.logout.lock().unwrap() = reply;
        self
    }

    pub fn with_me_latency(mut self, latency: Duration) -> Self {
        self.me_latency = latency;
        self
    }

    pub fn set_me(&self, reply: MeReply) {
        *self.me.lock().unwrap() = reply;
    }

    pub fn set_oauth(&self, reply: OAuthReply) {
        *self.oauth.lock().unwrap() = reply;
    }

    pub fn observe_storage(&self, storage: MemoryStorage) {
        *self.observed_storage.lock().unwrap() = Some(storage);
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn oauth_calls(&self) -> usize {
        self.oauth_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn me_max_in_flight(&self) -> usize {
        self.me_max_in_flight.load(Ordering::SeqCst)
    }

    pub fn oauth_requests(&self) -> Vec<OAuthStartRequest> {
        self.oauth_requests.lock().unwrap().clone()
    }

    pub fn offline_present_at_logout(&self) -> Vec<bool> {
        self.offline_present_at_logout.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.me_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.me_max_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = self.me.lock().unwrap().clone();
        if !self.me_latency.is_zero() {
            tokio::time::sleep(self.me_latency).await;
        }

        let result = match reply {
            MeReply::Identity(identity) => Ok(Some(identity)),
            MeReply::Unauthorized => Ok(None),
            MeReply::Status(code) => Err(AppError::Status(code)),
            MeReply::Refused => Err(AppError::ConnectionRefused("connection refused".into())),
            MeReply::Malformed => Err(AppError::InvalidResponse("missing field `id`".into())),
            MeReply::Hang => {
                tokio::time::sleep(HANG).await;
                Ok(None)
            }
        };

        self.me_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn start_oauth(&self, request: &OAuthStartRequest) -> Result<OAuthStartResponse> {
        self.oauth_calls.fetch_add(1, Ordering::SeqCst);
        self.oauth_requests.lock().unwrap().push(request.clone());

        let reply = self.oauth.lock().unwrap().clone();
        match reply {
            OAuthReply::Redirect(url) => Ok(OAuthStartResponse {
                success: true,
                redirect_url: Some(url),
                error: None,
            }),
            OAuthReply::Status(code) => Err(AppError::Status(code)),
            OAuthReply::MissingRedirect => Ok(OAuthStartResponse {
                success: true,
                redirect_url: None,
                error: None,
            }),
            OAuthReply::Rejected(msg) => Ok(OAuthStartResponse {
                success: false,
                redirect_url: None,
                error: Some(msg),
            }),
            OAuthReply::Refused => Err(AppError::ConnectionRefused("connection refused".into())),
            OAuthReply::Hang => {
                tokio::time::sleep(HANG).await;
                Ok(OAuthStartResponse::default())
            }
        }
    }

    async fn logout(&self) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);

        let observed = self.observed_storage.lock().unwrap().clone();
        if let Some(storage) = observed {
            self.offline_present_at_logout
                .lock()
                .unwrap()
                .push(storage.contains_key(keys::OFFLINE_IDENTITY));
        }

        let reply = self.logout.lock().unwrap().clone();
        match reply {
            LogoutReply::Ok => Ok(()),
            LogoutReply::Status(code) => Err(AppError::Status(code)),
            LogoutReply::Refused => Err(AppError::ConnectionRefused("connection refused".into())),
            LogoutReply::Hang => {
                tokio::time::sleep(HANG).await;
                Ok(())
            }
        }
    }
}

// ─── Storage that refuses to work ────────────────────────────────────────

/// Storage whose every operation fails.
#[allow(dead_code)]
pub struct BrokenStorage;

#[async_trait]
impl DurableStorage for BrokenStorage {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(AppError::Storage("disk unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<()> {
        Err(AppError::Storage("disk unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(AppError::Storage("disk unavailable".into()))
    }
}

// ─── Controller harness ──────────────────────────────────────────────────

#[allow(dead_code)]
pub struct Harness {
    pub controller: Arc<AuthController>,
    pub backend: Arc<ScriptedBackend>,
    pub navigator: Arc<RecordingNavigator>,
    pub events: EventBridge,
}

/// Controller over `backend` with the given storage.
#[allow(dead_code)]
pub fn harness_with_storage(
    backend: ScriptedBackend,
    storage: Arc<dyn DurableStorage>,
) -> Harness {
    let backend = Arc::new(backend);
    let navigator = Arc::new(RecordingNavigator::new());
    let events = EventBridge::default();
    let fallback = OfflineIdentityFallback::with_profile(storage, test_profile());

    let controller = AuthController::with_parts(
        &test_config(),
        backend.clone(),
        fallback,
        navigator.clone(),
        events.clone(),
    );

    Harness {
        controller: Arc::new(controller),
        backend,
        navigator,
        events,
    }
}

/// Controller over `backend` with in-memory storage shared with the caller.
#[allow(dead_code)]
pub fn harness(backend: ScriptedBackend, storage: &MemoryStorage) -> Harness {
    backend.observe_storage(storage.clone());
    harness_with_storage(backend, Arc::new(storage.clone()))
}

/// Poll `check` until it holds or the timeout elapses.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

// ─── HTTP mock identity service ──────────────────────────────────────────

#[allow(dead_code)]
pub mod http {
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Canned replies for the mock identity service.
    #[derive(Clone)]
    pub struct MockReplies {
        pub me_status: u16,
        pub me_body: Value,
        pub me_delay: Duration,
        pub oauth_status: u16,
        pub oauth_body: Value,
        pub logout_status: u16,
    }

    impl Default for MockReplies {
        fn default() -> Self {
            Self {
                me_status: 401,
                me_body: serde_json::json!({"error": "unauthorized"}),
                me_delay: Duration::ZERO,
                oauth_status: 200,
                oauth_body: serde_json::json!({"success": true, "redirectUrl": "https://accounts.example.com/o/oauth2"}),
                logout_status: 200,
            }
        }
    }

    #[derive(Default)]
    pub struct Recorded {
        pub oauth_bodies: Mutex<Vec<Value>>,
        pub logout_calls: Mutex<usize>,
    }

    struct MockState {
        replies: MockReplies,
        recorded: Arc<Recorded>,
    }

    pub struct MockService {
        pub base_url: String,
        pub recorded: Arc<Recorded>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Drop for MockService {
        fn drop(&mut self) {
            self.handle.abort();
        }
    }

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    async fn me(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
        if !state.replies.me_delay.is_zero() {
            tokio::time::sleep(state.replies.me_delay).await;
        }
        (
            status(state.replies.me_status),
            Json(state.replies.me_body.clone()),
        )
    }

    async fn oauth_start(
        State(state): State<Arc<MockState>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        state.recorded.oauth_bodies.lock().unwrap().push(body);
        (
            status(state.replies.oauth_status),
            Json(state.replies.oauth_body.clone()),
        )
    }

    async fn logout(State(state): State<Arc<MockState>>) -> StatusCode {
        *state.recorded.logout_calls.lock().unwrap() += 1;
        status(state.replies.logout_status)
    }

    /// Serve the mock identity service on an ephemeral port.
    pub async fn spawn(replies: MockReplies) -> MockService {
        let recorded = Arc::new(Recorded::default());
        let state = Arc::new(MockState {
            replies,
            recorded: recorded.clone(),
        });

        let app = Router::new()
            .route("/api/auth/me", get(me))
            .route("/api/auth/oauth/start", post(oauth_start))
            .route("/api/auth/logout", post(logout))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().expect("Mock service has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockService {
            base_url: format!("http://{}", addr),
            recorded,
            handle,
        }
    }

    /// An address nothing listens on.
    pub async fn refused_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind probe listener");
        let addr: SocketAddr = listener.local_addr().expect("Probe has no address");
        drop(listener);
        format!("http://{}", addr)
    }
}
