//! Invitation persistence behind a single interface.
//!
//! At session start [`Store::connect`] probes the remote store once and
//! classifies the session as remote-ready or demo mode; the classification
//! is never re-evaluated. Records created in demo mode carry a `demo-`
//! prefixed id so later lookups route to the local backend even when the
//! session itself is remote. Both backends enforce record expiry before
//! decryption.

pub mod link;
pub mod local;
pub mod remote;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::codec::InvitationCodec;
use crate::config::ClientConfig;
use crate::key::KeyProvider;
use crate::model::{Invitation, NewInvitation, RsvpStatus, DEMO_ID_PREFIX, URL_ID_PREFIX};

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given id.
    #[error("invitation not found: {0}")]
    NotFound(String),

    /// The record exists but its retention window has passed.
    #[error("this invitation has expired")]
    Expired,

    /// The remote store request failed (network or HTTP status).
    #[error("remote store error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an unusable payload.
    #[error("remote store returned an unexpected response: {0}")]
    Backend(String),

    /// A local record could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored record could not be parsed.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    /// A link payload is not valid base64.
    #[error("invalid invitation link")]
    InvalidLink,
}

/// Session storage classification, decided once at [`Store::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// The remote relational store answered the startup probe.
    Remote,
    /// Missing credentials or an unreachable store; local storage only.
    Demo,
}

/// Reject a record whose retention window has passed.
///
/// Expiry is checked before decryption: an expired record is unreadable
/// regardless of whether decryption would succeed.
pub(crate) fn ensure_not_expired(expires_at: DateTime<Utc>) -> Result<(), StoreError> {
    if Utc::now() > expires_at {
        return Err(StoreError::Expired);
    }
    Ok(())
}

/// The backend selected for this session.
enum Backend {
    Remote(RemoteStore),
    Local(LocalStore),
}

impl Backend {
    async fn create(&self, new: &NewInvitation) -> Result<String, StoreError> {
        match self {
            Backend::Remote(s) => s.create(new).await,
            Backend::Local(s) => s.create(new).await,
        }
    }

    async fn get(&self, id: &str) -> Result<Invitation, StoreError> {
        match self {
            Backend::Remote(s) => s.get(id).await,
            Backend::Local(s) => s.get(id).await,
        }
    }

    async fn update_rsvp(&self, id: &str, status: RsvpStatus) -> Result<(), StoreError> {
        match self {
            Backend::Remote(s) => s.update_rsvp(id, status).await,
            Backend::Local(s) => s.update_rsvp(id, status).await,
        }
    }
}

/// Session-scoped persistence adapter.
pub struct Store {
    backend: Backend,
    /// Demo-prefixed ids always resolve locally, whatever the backend.
    demo: LocalStore,
    keys: Arc<KeyProvider>,
    link_retention: Duration,
}

impl Store {
    /// Probe the remote store once and build the adapter for this session.
    ///
    /// A missing credential pair or a failed probe both degrade to demo
    /// mode with a warning; neither is a startup failure.
    pub async fn connect(cfg: &ClientConfig, keys: Arc<KeyProvider>) -> Store {
        let demo = LocalStore::new(
            cfg.data_dir.clone().into(),
            keys.clone(),
            Duration::hours(cfg.demo_retention_hours),
        );
        let link_retention = Duration::hours(cfg.demo_retention_hours);

        let backend = match RemoteStore::connect(cfg, keys.clone()).await {
            Ok(remote) => {
                info!("remote store ready");
                Backend::Remote(remote)
            }
            Err(reason) => {
                warn!(%reason, "remote store unavailable; running in demo mode");
                Backend::Local(demo.clone())
            }
        };

        Store {
            backend,
            demo,
            keys,
            link_retention,
        }
    }

    /// The storage classification made at connect time.
    pub fn mode(&self) -> StoreMode {
        match self.backend {
            Backend::Remote(_) => StoreMode::Remote,
            Backend::Local(_) => StoreMode::Demo,
        }
    }

    /// Encrypt and persist a new invitation; returns its id.
    pub async fn create(&self, new: &NewInvitation) -> Result<String, StoreError> {
        self.backend.create(new).await
    }

    /// Fetch, expiry-check, and decrypt an invitation by id.
    ///
    /// Routes by id prefix: `demo-` ids are local records regardless of the
    /// session backend.
    pub async fn get(&self, id: &str) -> Result<Invitation, StoreError> {
        if id.starts_with(DEMO_ID_PREFIX) {
            return self.demo.get(id).await;
        }
        self.backend.get(id).await
    }

    /// Record an RSVP. Last write wins; there is no concurrency check.
    pub async fn update_rsvp(&self, id: &str, status: RsvpStatus) -> Result<(), StoreError> {
        if id.starts_with(DEMO_ID_PREFIX) {
            return self.demo.update_rsvp(id, status).await;
        }
        self.backend.update_rsvp(id, status).await
    }

    /// Build a self-contained shareable link payload for an invitation.
    ///
    /// The payload carries its own expiry and codec-encrypted sensitive
    /// fields; no storage write happens.
    pub async fn create_link(&self, new: &NewInvitation) -> Result<String, StoreError> {
        let key = self.keys.get().await;
        let codec = InvitationCodec::new(key);
        let id = format!("{URL_ID_PREFIX}{}", uuid::Uuid::new_v4());
        let mut record = codec.new_record(id, new, Utc::now(), self.link_retention);
        codec.encrypt_record(&mut record);
        link::encode_invitation(&record)
    }

    /// Decode, expiry-check, and decrypt a shareable link payload.
    pub async fn open_link(&self, payload: &str) -> Result<Invitation, StoreError> {
        let mut record = link::decode_invitation(payload)?;
        let key = self.keys.get().await;
        InvitationCodec::new(key).decrypt_record(&mut record);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono::TimeZone;

    fn demo_config(dir: &std::path::Path) -> ClientConfig {
        ClientConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            ..ClientConfig::default()
        }
    }

    fn sample_form() -> NewInvitation {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        NewInvitation {
            to: "Sarah".into(),
            from: "Alex".into(),
            event: "Picnic".into(),
            message: None,
            youtube_url: None,
            time: tz.with_ymd_and_hms(2026, 9, 12, 19, 0, 0).unwrap(),
            theme: "sunset".into(),
        }
    }

    async fn demo_store(dir: &std::path::Path) -> Store {
        let cfg = demo_config(dir);
        let keys = Arc::new(KeyProvider::new(&cfg));
        Store::connect(&cfg, keys).await
    }

    #[tokio::test]
    async fn missing_credentials_select_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store = demo_store(dir.path()).await;
        assert_eq!(store.mode(), StoreMode::Demo);
    }

    #[tokio::test]
    async fn demo_create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = demo_store(dir.path()).await;

        let id = store.create(&sample_form()).await.unwrap();
        assert!(id.starts_with(DEMO_ID_PREFIX));

        let inv = store.get(&id).await.unwrap();
        assert_eq!(inv.to, "Sarah");
        assert_eq!(inv.from, "Alex");
        assert_eq!(inv.event, "Picnic");
        assert_eq!(inv.rsvp_status, RsvpStatus::Pending);
    }

    #[tokio::test]
    async fn rsvp_update_is_visible_on_next_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = demo_store(dir.path()).await;

        let id = store.create(&sample_form()).await.unwrap();
        store.update_rsvp(&id, RsvpStatus::Yes).await.unwrap();
        let inv = store.get(&id).await.unwrap();
        assert_eq!(inv.rsvp_status, RsvpStatus::Yes);

        // Re-deciding after a decline is allowed.
        store.update_rsvp(&id, RsvpStatus::No).await.unwrap();
        store.update_rsvp(&id, RsvpStatus::Yes).await.unwrap();
        let inv = store.get(&id).await.unwrap();
        assert_eq!(inv.rsvp_status, RsvpStatus::Yes);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = demo_store(dir.path()).await;
        let err = store.get("demo-nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn link_round_trip_restores_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let store = demo_store(dir.path()).await;

        let payload = store.create_link(&sample_form()).await.unwrap();
        // The payload itself must not leak plaintext.
        assert!(!payload.contains("Sarah"));

        let inv = store.open_link(&payload).await.unwrap();
        assert!(inv.id.starts_with(URL_ID_PREFIX));
        assert_eq!(inv.to, "Sarah");
        assert_eq!(inv.event, "Picnic");
    }
}
