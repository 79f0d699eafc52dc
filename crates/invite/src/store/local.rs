//! [`LocalStore`]: the demo-mode backend.
//!
//! Records are JSON files named `invitation-<id>.json` in the data
//! directory, in the display schema with sensitive fields encrypted. Ids
//! are `demo-` prefixed so lookups route here in any session mode. Writes
//! are last-write-wins; there is no concurrent writer within one session.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::codec::InvitationCodec;
use crate::key::KeyProvider;
use crate::model::{Invitation, NewInvitation, RsvpStatus, DEMO_ID_PREFIX};

use super::{ensure_not_expired, StoreError};

/// File-backed demo storage.
#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
    keys: Arc<KeyProvider>,
    retention: Duration,
}

impl LocalStore {
    /// Create a local store rooted at `dir`. The directory is created on
    /// first write.
    pub fn new(dir: PathBuf, keys: Arc<KeyProvider>, retention: Duration) -> Self {
        Self {
            dir,
            keys,
            retention,
        }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("invitation-{id}.json"))
    }

    /// Encrypt and persist a new invitation; returns its `demo-` id.
    pub async fn create(&self, new: &NewInvitation) -> Result<String, StoreError> {
        let key = self.keys.get().await;
        let codec = InvitationCodec::new(key);

        let id = format!("{DEMO_ID_PREFIX}{}", Uuid::new_v4());
        let mut record = codec.new_record(id.clone(), new, Utc::now(), self.retention);
        codec.encrypt_record(&mut record);

        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(&record)?;
        tokio::fs::write(self.record_path(&id), bytes).await?;

        debug!(%id, "demo invitation written");
        Ok(id)
    }

    /// Fetch, expiry-check, and decrypt an invitation.
    pub async fn get(&self, id: &str) -> Result<Invitation, StoreError> {
        let raw = self.read_raw(id).await?;
        ensure_not_expired(raw.expires_at)?;

        let key = self.keys.get().await;
        let mut record = raw;
        InvitationCodec::new(key).decrypt_record(&mut record);
        Ok(record)
    }

    /// Record an RSVP by rewriting the stored record.
    pub async fn update_rsvp(&self, id: &str, status: RsvpStatus) -> Result<(), StoreError> {
        let mut raw = self.read_raw(id).await?;
        ensure_not_expired(raw.expires_at)?;

        raw.rsvp_status = status;
        let bytes = serde_json::to_vec(&raw)?;
        tokio::fs::write(self.record_path(id), bytes).await?;
        Ok(())
    }

    /// Read a stored record without touching its encrypted fields.
    async fn read_raw(&self, id: &str) -> Result<Invitation, StoreError> {
        let bytes = match tokio::fs::read(self.record_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
