//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type for the key-issuance endpoint.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::Unauthorized`] → 403
/// - [`ServiceError::Misconfigured`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request failed the shared-secret handshake — bad verification
    /// token or a timestamp outside the freshness window.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server is missing required configuration (no encryption key).
    #[error("service misconfigured: {0}")]
    Misconfigured(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Unauthorized(_) => 403,
            ServiceError::Misconfigured(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// The caller-safe message carried by this error, without the variant
    /// prefix that [`std::fmt::Display`] adds.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Unauthorized(m)
            | ServiceError::Misconfigured(m)
            | ServiceError::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::Unauthorized("x".into()).http_status(), 403);
        assert_eq!(ServiceError::Misconfigured("x".into()).http_status(), 500);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::Unauthorized("stale timestamp".into());
        assert!(e.to_string().contains("stale timestamp"));
    }

    #[test]
    fn message_has_no_variant_prefix() {
        let e = ServiceError::Misconfigured("Encryption key not configured".into());
        assert_eq!(e.message(), "Encryption key not configured");
    }
}
