//! Request and response types for the key-issuance handshake.
//!
//! These types are serialised as JSON between the invitation client and the
//! key server.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Key issuance endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/encryption-key`.
///
/// The `verification` field carries a base64 encoding of the shared
/// application token. It is a deterrent against casual replay from outside
/// the app, not an authentication boundary — the token is visible to anyone
/// reading the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRequest {
    /// Client clock at request time, in milliseconds since the Unix epoch.
    /// Requests older (or newer) than the server's freshness window are
    /// rejected.
    pub timestamp: i64,
    /// Base64 encoding of the shared verification token.
    pub verification: String,
}

/// Successful response body for `POST /api/encryption-key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyResponse {
    /// The symmetric session key, sourced from server configuration.
    pub key: String,
    /// Server clock at response time, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description safe to expose to callers.
    pub error: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the encryption key is present in server configuration.
    pub key_configured: bool,
}
