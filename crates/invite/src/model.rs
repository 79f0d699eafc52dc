//! Invitation data model: the display schema used by the UI, the storage
//! schema used by the remote store, and the creator-form payload.
//!
//! The same logical record exists under two field namings. The remote store
//! persists [`StoredInvitation`] (snake_case, `to_name`/`from_name`/...);
//! the UI works with [`Invitation`] (camelCase over the wire). Translation
//! between the two lives in [`crate::codec`], next to the encryption that
//! applies to the same fields.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Id prefix marking a record stored in the local demo backend.
pub const DEMO_ID_PREFIX: &str = "demo-";

/// Id prefix marking a self-contained link-encoded record.
pub const URL_ID_PREFIX: &str = "url-";

/// RSVP state of an invitation.
///
/// Canonical wire values are `pending` / `yes` / `no`; the earlier
/// revision's `accepted` / `declined` are accepted on input. Transitions
/// are `pending → yes|no`, and flipping between `yes` and `no` afterwards
/// is allowed — there is no terminal lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    #[serde(alias = "accepted")]
    Yes,
    #[serde(alias = "declined")]
    No,
}

/// The display view of an invitation, as consumed by page components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub to: String,
    pub from: String,
    /// Free-text plan description.
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_video_id: Option<String>,
    /// Event moment, stored in UTC and rendered in viewer-local time.
    pub time: DateTime<Utc>,
    /// Identifier into the fixed theme catalog.
    pub theme: String,
    pub rsvp_status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The remote-store row shape (snake_case storage schema).
///
/// Sensitive fields hold ciphertext at rest; `theme`, timestamps, and the
/// rsvp status are stored in the clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInvitation {
    /// Store-issued identifier. Absent on insert payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub to_name: String,
    pub from_name: String,
    pub event_time: DateTime<Utc>,
    pub event_description: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub youtube_video_id: Option<String>,
    pub theme: String,
    pub rsvp_status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub rsvp_updated_at: Option<DateTime<Utc>>,
}

/// Creator-form payload: what the UI submits to create an invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvitation {
    pub to: String,
    pub from: String,
    pub event: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    /// The creator's local event moment; normalized to UTC before storage.
    pub time: DateTime<FixedOffset>,
    pub theme: String,
}

/// Extract the video id from a YouTube watch or share URL.
///
/// Handles `youtube.com/watch?v=<id>` and `youtu.be/<id>` forms; returns
/// `None` for anything else. The id is display metadata, not a sensitive
/// field.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if let Some(rest) = trimmed.split("youtu.be/").nth(1) {
        let id: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        return (!id.is_empty()).then_some(id);
    }
    if trimmed.contains("youtube.com") {
        let query = trimmed.split('?').nth(1)?;
        for pair in query.split('&') {
            if let Some(v) = pair.strip_prefix("v=") {
                let id: String = v
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                    .collect();
                return (!id.is_empty()).then_some(id);
            }
        }
    }
    None
}
