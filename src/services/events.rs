//! Event bridge: in-memory publish/subscribe for auth signals.
//!
//! Lets any part of the application request re-resolution without holding a
//! reference to the session store. Lives for the process only.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default number of buffered signals per subscriber.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthSignal {
    /// A redirect callback completed; identity should be re-resolved.
    AuthSuccess,
    /// Something asked for a fresh identity check.
    AuthRefresh,
    SignedOut,
    /// Sign-in degraded to an offline identity.
    OfflineFallback,
}

impl AuthSignal {
    pub fn name(&self) -> &'static str {
        match self {
            AuthSignal::AuthSuccess => "auth-success",
            AuthSignal::AuthRefresh => "auth-refresh",
            AuthSignal::SignedOut => "auth-signed-out",
            AuthSignal::OfflineFallback => "auth-offline-fallback",
        }
    }

    /// Signals that should trigger identity re-resolution.
    pub fn triggers_resolution(&self) -> bool {
        matches!(self, AuthSignal::AuthSuccess | AuthSignal::AuthRefresh)
    }
}

impl fmt::Display for AuthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth-success" => Ok(AuthSignal::AuthSuccess),
            "auth-refresh" => Ok(AuthSignal::AuthRefresh),
            "auth-signed-out" => Ok(AuthSignal::SignedOut),
            "auth-offline-fallback" => Ok(AuthSignal::OfflineFallback),
            other => Err(format!("unknown auth signal: {}", other)),
        }
    }
}

#[derive(Clone)]
pub struct EventBridge {
    tx: broadcast::Sender<AuthSignal>,
}

impl EventBridge {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a signal. Returns the number of subscribers that received it.
    pub fn publish(&self, signal: AuthSignal) -> usize {
        match self.tx.send(signal) {
            Ok(count) => {
                tracing::debug!(signal = %signal, receivers = count, "Auth signal published");
                count
            }
            Err(_) => 0, // No active receivers
        }
    }

    /// Receiver for every signal published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthSignal> {
        self.tx.subscribe()
    }

    /// Run `handler` for each future occurrence of `signal`.
    ///
    /// The handler is awaited before the next signal is taken, so its
    /// invocations never overlap. Abort the returned handle to unsubscribe.
    pub fn on<F, Fut>(&self, signal: AuthSignal, handler: F) -> JoinHandle<()>
    where
        F: Fn(AuthSignal) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_any(move |s| s == signal, handler)
    }

    /// Run `handler` for each future signal accepted by `filter`.
    pub fn on_any<P, F, Fut>(&self, filter: P, handler: F) -> JoinHandle<()>
    where
        P: Fn(AuthSignal) -> bool + Send + 'static,
        F: Fn(AuthSignal) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(signal) if filter(signal) => handler(signal).await,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth signal listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
