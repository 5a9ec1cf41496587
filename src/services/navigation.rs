//! Navigation seam.
//!
//! The controller never drives a UI directly. A successful OAuth start hands
//! the redirect URL to the navigator, and sign-out asks it to reset the
//! application to its root, discarding identity-scoped state.

use std::sync::Mutex;

pub trait Navigator: Send + Sync {
    /// Full navigation to an external URL (the OAuth provider).
    fn navigate(&self, url: &str);

    /// Full reset to the application root.
    fn reset_to_root(&self, root_url: &str);
}

/// Navigator for headless use: logs targets and prints redirect URLs so a
/// user can open them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &str) {
        tracing::info!(url = %url, "Redirecting to identity provider");
        println!("Open this URL to continue: {}", url);
    }

    fn reset_to_root(&self, root_url: &str) {
        tracing::info!(root = %root_url, "Resetting application to root");
    }
}

/// A navigation that was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Redirect(String),
    ResetToRoot(String),
}

/// Navigator that records requests instead of acting on them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    fn record(&self, navigation: Navigation) {
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.record(Navigation::Redirect(url.to_string()));
    }

    fn reset_to_root(&self, root_url: &str) {
        self.record(Navigation::ResetToRoot(root_url.to_string()));
    }
}
