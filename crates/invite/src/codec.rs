//! [`InvitationCodec`]: applies the text cipher across the fixed set of
//! sensitive invitation fields and translates between the storage schema
//! (`to_name`, `from_name`, `event_description`, ...) and the display schema
//! (`to`, `from`, `event`, ...).
//!
//! Field-name translation lives here rather than in the persistence layer so
//! that a change to what is encrypted and a change to what it is called stay
//! in one place. Each field is processed independently: one undecryptable
//! field never blocks the others, because the cipher never raises.

use chrono::{DateTime, Duration, Utc};

use crate::crypto::{decrypt_text, encrypt_text};
use crate::model::{youtube_video_id, Invitation, NewInvitation, RsvpStatus, StoredInvitation};

/// Per-session codec over the invitation field set.
pub struct InvitationCodec<'a> {
    key: &'a str,
}

impl<'a> InvitationCodec<'a> {
    /// Create a codec bound to the session key.
    pub fn new(key: &'a str) -> Self {
        Self { key }
    }

    fn enc(&self, text: &str) -> String {
        encrypt_text(text, self.key)
    }

    fn enc_opt(&self, text: &Option<String>) -> Option<String> {
        text.as_deref().map(|t| encrypt_text(t, self.key))
    }

    fn dec(&self, text: &str) -> String {
        decrypt_text(text, self.key).into_inner()
    }

    fn dec_opt(&self, text: Option<String>) -> Option<String> {
        text.map(|t| decrypt_text(&t, self.key).into_inner())
    }

    /// Build an encrypted storage row from a creator-form payload.
    ///
    /// Sensitive fields are encrypted; `theme` is untouched; `time` is
    /// normalised to UTC. Lifecycle stamps are filled here so that
    /// `expires_at` is always `created_at + retention`.
    pub fn to_storage(
        &self,
        new: &NewInvitation,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> StoredInvitation {
        StoredInvitation {
            id: None,
            to_name: self.enc(&new.to),
            from_name: self.enc(&new.from),
            event_time: new.time.with_timezone(&Utc),
            event_description: self.enc(&new.event),
            message: self.enc_opt(&new.message),
            youtube_url: self.enc_opt(&new.youtube_url),
            youtube_video_id: new.youtube_url.as_deref().and_then(youtube_video_id),
            theme: new.theme.clone(),
            rsvp_status: RsvpStatus::Pending,
            created_at: now,
            expires_at: now + retention,
            rsvp_updated_at: None,
        }
    }

    /// Decrypt a storage row and translate it to the display schema.
    pub fn from_storage(&self, stored: StoredInvitation) -> Invitation {
        Invitation {
            id: stored.id.unwrap_or_default(),
            to: self.dec(&stored.to_name),
            from: self.dec(&stored.from_name),
            event: self.dec(&stored.event_description),
            message: self.dec_opt(stored.message),
            youtube_url: self.dec_opt(stored.youtube_url),
            youtube_video_id: stored.youtube_video_id,
            time: stored.event_time,
            theme: stored.theme,
            rsvp_status: stored.rsvp_status,
            created_at: stored.created_at,
            expires_at: stored.expires_at,
        }
    }

    /// Build a plaintext display record from a creator-form payload, for the
    /// local and link paths that persist display field names directly.
    pub fn new_record(
        &self,
        id: String,
        new: &NewInvitation,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Invitation {
        Invitation {
            id,
            to: new.to.clone(),
            from: new.from.clone(),
            event: new.event.clone(),
            message: new.message.clone(),
            youtube_url: new.youtube_url.clone(),
            youtube_video_id: new.youtube_url.as_deref().and_then(youtube_video_id),
            time: new.time.with_timezone(&Utc),
            theme: new.theme.clone(),
            rsvp_status: RsvpStatus::Pending,
            created_at: now,
            expires_at: now + retention,
        }
    }

    /// Encrypt the sensitive fields of a display-named record in place.
    pub fn encrypt_record(&self, inv: &mut Invitation) {
        inv.to = self.enc(&inv.to);
        inv.from = self.enc(&inv.from);
        inv.event = self.enc(&inv.event);
        inv.message = self.enc_opt(&inv.message);
        inv.youtube_url = self.enc_opt(&inv.youtube_url);
    }

    /// Decrypt the sensitive fields of a display-named record in place.
    pub fn decrypt_record(&self, inv: &mut Invitation) {
        inv.to = self.dec(&inv.to);
        inv.from = self.dec(&inv.from);
        inv.event = self.dec(&inv.event);
        inv.message = self.dec_opt(inv.message.take());
        inv.youtube_url = self.dec_opt(inv.youtube_url.take());
    }
}
