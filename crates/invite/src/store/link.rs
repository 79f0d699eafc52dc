//! Self-contained shareable invitation links.
//!
//! A link payload is a base64url encoding of the display-schema record as
//! JSON, carrying its own `expiresAt`. No storage lookup is needed to open
//! one; expiry is enforced at decode time, before any decryption. Callers
//! are expected to pass records whose sensitive fields are already
//! codec-encrypted — the payload is world-readable by construction.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::model::Invitation;

use super::{ensure_not_expired, StoreError};

/// Encode an invitation record into a link payload.
pub fn encode_invitation(inv: &Invitation) -> Result<String, StoreError> {
    let json = serde_json::to_vec(inv)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a link payload back into an invitation record.
///
/// # Errors
///
/// Returns [`StoreError::InvalidLink`] for payloads that are not base64,
/// [`StoreError::Serde`] for payloads that are not an invitation, and
/// [`StoreError::Expired`] once the embedded expiry has passed.
pub fn decode_invitation(payload: &str) -> Result<Invitation, StoreError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim())
        .map_err(|_| StoreError::InvalidLink)?;
    let inv: Invitation = serde_json::from_slice(&bytes)?;
    ensure_not_expired(inv.expires_at)?;
    Ok(inv)
}

/// Build the full shareable URL for a link payload.
pub fn invitation_url(base_url: &str, payload: &str) -> String {
    format!("{}/invitation?data={payload}", base_url.trim_end_matches('/'))
}
