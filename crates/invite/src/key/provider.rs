//! [`KeyProvider`]: session-scoped cache for the symmetric encryption key.
//!
//! # Lifecycle
//!
//! 1. The first [`KeyProvider::get`] call POSTs `{timestamp, verification}`
//!    to the configured key endpoint.
//! 2. Concurrent first callers are serialised onto the same in-flight
//!    request by [`tokio::sync::OnceCell`]; exactly one network call is
//!    issued per session.
//! 3. The resolved key — real or fallback — is cached for the process
//!    lifetime. There is no expiry or refresh, so one session sees one key.
//!
//! Any failure (no endpoint configured, network error, non-2xx response,
//! unparseable body) resolves to the fixed fallback key with a warning.
//! The session must never block on key retrieval; the fallback trades
//! confidentiality for availability.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use common::protocol::{KeyRequest, KeyResponse};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// Errors from a key-retrieval attempt. Never escape [`KeyProvider::get`];
/// they only feed the fallback decision and the warning log.
#[derive(Debug, Error)]
enum KeyError {
    /// No key endpoint is configured for this session.
    #[error("no key endpoint configured")]
    NoEndpoint,

    /// The HTTP request failed or returned a non-success status.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Session-scoped provider of the symmetric encryption key.
#[derive(Debug)]
pub struct KeyProvider {
    endpoint: Option<String>,
    verification_token: String,
    fallback_key: String,
    client: reqwest::Client,
    cached: OnceCell<String>,
}

impl KeyProvider {
    /// Create a provider from client configuration.
    ///
    /// The HTTP client carries a defensive timeout so a hung key endpoint
    /// cannot stall the session past the configured bound.
    pub fn new(cfg: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.key_request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            endpoint: cfg.key_endpoint.clone(),
            verification_token: cfg.verification_token.clone(),
            fallback_key: cfg.fallback_key.clone(),
            client,
            cached: OnceCell::new(),
        }
    }

    /// Resolve the session key.
    ///
    /// The first call performs the network handshake; every later call (and
    /// every concurrent call racing the first) returns the same cached
    /// outcome. This function does not fail — on any retrieval error it
    /// resolves to the fallback key.
    pub async fn get(&self) -> &str {
        self.cached
            .get_or_init(|| async {
                match self.fetch().await {
                    Ok(key) => {
                        debug!("session key retrieved from key endpoint");
                        key
                    }
                    Err(e) => {
                        warn!(error = %e, "could not fetch session key; using fallback");
                        self.fallback_key.clone()
                    }
                }
            })
            .await
    }

    async fn fetch(&self) -> Result<String, KeyError> {
        let endpoint = self.endpoint.as_deref().ok_or(KeyError::NoEndpoint)?;

        let request = KeyRequest {
            timestamp: Utc::now().timestamp_millis(),
            verification: STANDARD.encode(self.verification_token.as_bytes()),
        };

        let response: KeyResponse = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.key)
    }
}
