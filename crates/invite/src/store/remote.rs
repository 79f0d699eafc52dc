//! [`RemoteStore`]: Supabase-backed persistence over the PostgREST API.
//!
//! Rows live in the `invitations` table in the storage schema
//! ([`StoredInvitation`]); every request carries the anonymous API key. The
//! startup probe distinguishes missing credentials from an unreachable
//! store, but both collapse into demo mode at the session level.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::debug;

use crate::codec::InvitationCodec;
use crate::config::ClientConfig;
use crate::key::KeyProvider;
use crate::model::{Invitation, NewInvitation, RsvpStatus, StoredInvitation};

use super::{ensure_not_expired, StoreError};

/// Why the startup probe declined the remote store.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The credential pair is not configured.
    #[error("remote store credentials not configured")]
    Misconfigured,

    /// The store did not answer the probe.
    #[error("remote store unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// PostgREST client for the `invitations` table.
#[derive(Debug)]
pub struct RemoteStore {
    client: reqwest::Client,
    /// Full URL of the invitations resource, `<project>/rest/v1/invitations`.
    base_url: String,
    anon_key: String,
    keys: Arc<KeyProvider>,
    retention: Duration,
}

impl RemoteStore {
    /// Validate credentials and probe the store once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Misconfigured`] when the credential pair is
    /// absent and [`ProbeError::Unreachable`] when the probe request fails.
    pub async fn connect(cfg: &ClientConfig, keys: Arc<KeyProvider>) -> Result<Self, ProbeError> {
        let (Some(url), Some(anon_key)) = (&cfg.supabase_url, &cfg.supabase_anon_key) else {
            return Err(ProbeError::Misconfigured);
        };

        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        let store = Self {
            client,
            base_url: format!("{}/rest/v1/invitations", url.trim_end_matches('/')),
            anon_key: anon_key.clone(),
            keys,
            retention: Duration::hours(cfg.remote_retention_hours),
        };
        store.probe().await?;
        Ok(store)
    }

    /// Lightweight reachability probe: select a single id.
    async fn probe(&self) -> Result<(), reqwest::Error> {
        self.client
            .get(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Encrypt and insert a new invitation; returns the store-issued id.
    pub async fn create(&self, new: &NewInvitation) -> Result<String, StoreError> {
        let key = self.keys.get().await;
        let stored = InvitationCodec::new(key).to_storage(new, Utc::now(), self.retention);

        let rows: Vec<StoredInvitation> = self
            .client
            .post(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=representation")
            .json(&[&stored])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let id = rows
            .into_iter()
            .next()
            .and_then(|row| row.id)
            .ok_or_else(|| StoreError::Backend("insert returned no id".into()))?;
        debug!(%id, "invitation inserted");
        Ok(id)
    }

    /// Fetch, expiry-check, decrypt, and translate an invitation row.
    pub async fn get(&self, id: &str) -> Result<Invitation, StoreError> {
        let rows: Vec<StoredInvitation> = self
            .client
            .get(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .query(&[("id", &format!("eq.{id}")), ("select", &"*".to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        ensure_not_expired(stored.expires_at)?;

        let key = self.keys.get().await;
        Ok(InvitationCodec::new(key).from_storage(stored))
    }

    /// Record an RSVP and stamp `rsvp_updated_at`. Last write wins.
    pub async fn update_rsvp(&self, id: &str, status: RsvpStatus) -> Result<(), StoreError> {
        self.client
            .patch(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .query(&[("id", format!("eq.{id}"))])
            .json(&serde_json::json!({
                "rsvp_status": status,
                "rsvp_updated_at": Utc::now(),
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
