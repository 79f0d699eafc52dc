//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so that Axum
/// can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// The session key released to verified requests. `None` means the
    /// service is misconfigured and the issuance endpoint answers 500.
    pub encryption_key: Option<Arc<str>>,
    /// Plaintext verification token expected (base64-encoded) in requests.
    pub verification_token: Arc<str>,
    /// Maximum allowed clock skew between client and server.
    pub freshness_window: Duration,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(
        encryption_key: Option<String>,
        verification_token: String,
        freshness_window: Duration,
    ) -> Self {
        Self {
            encryption_key: encryption_key.map(Arc::from),
            verification_token: Arc::from(verification_token),
            freshness_window,
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with no key configured, suitable for tests.
    fn default() -> Self {
        Self::new(None, "yournextdate-app".into(), Duration::from_secs(300))
    }
}
