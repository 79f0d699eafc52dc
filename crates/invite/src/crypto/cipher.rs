//! AES-256-GCM-SIV encryption and decryption of individual string fields.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant,
//! so a repeated nonce degrades gracefully instead of breaking authentication.
//! The 256-bit key is derived from the session key string via SHA-256.
//!
//! **Failure contract:** this layer never surfaces an error to its callers.
//! Encryption of empty input is the identity; decryption of anything that is
//! not valid ciphertext under the given key hands the input back unchanged,
//! tagged as [`Decrypted::Unchanged`]. The UI depends on that pass-through —
//! a corrupt field must never take the whole invitation down.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Prefix that appears at the start of every encrypted field value.
pub const VERSION_PREFIX: &str = "v1";

/// Outcome of a decryption attempt.
///
/// `Plaintext` carries text that was genuinely recovered from ciphertext;
/// `Unchanged` carries input that was handed back as-is (wrong key, tampered
/// data, or a value that never was ciphertext). Callers that only want the
/// never-raise contract use [`Decrypted::into_inner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrypted {
    Plaintext(String),
    Unchanged(String),
}

impl Decrypted {
    /// Unwrap to the contained string, whichever side it is.
    pub fn into_inner(self) -> String {
        match self {
            Decrypted::Plaintext(s) | Decrypted::Unchanged(s) => s,
        }
    }

    /// Returns `true` if the input was handed back without decryption.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Decrypted::Unchanged(_))
    }
}

/// A parsed, encrypted field value.
///
/// The string representation is `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EncryptedText {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptedText {
    /// Encode this value to its canonical string representation.
    fn to_string_repr(&self) -> String {
        format!(
            "{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }

    /// Parse an encrypted field string back into an [`EncryptedText`].
    fn from_str(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.splitn(3, '.').collect();
        if parts.len() != 3 || parts[0] != VERSION_PREFIX {
            return Err(CipherError::InvalidFormat);
        }
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| CipherError::InvalidFormat)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_bytes);

        let ciphertext = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| CipherError::InvalidFormat)?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Internal cipher errors. Swallowed at this module's boundary.
#[derive(Debug, Error)]
enum CipherError {
    /// AES-GCM-SIV encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The encrypted field string does not match the expected format.
    #[error("invalid encrypted field format")]
    InvalidFormat,

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    NotUtf8,
}

/// Derive the 256-bit AES key from the session key string.
fn derive_key(session_key: &str) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(session_key.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest);
    key
}

fn build_cipher(session_key: &str) -> Aes256GcmSiv {
    let key = derive_key(session_key);
    Aes256GcmSiv::new((&key).into())
}

/// Encrypt a plaintext string field using the session key.
///
/// A random 96-bit nonce is generated per call via the OS CSPRNG, so the
/// same plaintext encrypts to a different string each time. Empty input is
/// returned unchanged, never encrypted. On an internal AEAD failure the
/// original text is returned and a warning is logged.
pub fn encrypt_text(text: &str, session_key: &str) -> String {
    if text.is_empty() {
        return text.to_owned();
    }

    let cipher = build_cipher(session_key);

    use aes_gcm_siv::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    match cipher.encrypt(nonce, text.as_bytes()) {
        Ok(ciphertext) => EncryptedText {
            nonce: nonce_bytes,
            ciphertext,
        }
        .to_string_repr(),
        Err(_) => {
            warn!("field encryption failed; storing original text");
            text.to_owned()
        }
    }
}

/// Decrypt an encrypted field string back to plaintext.
///
/// Returns [`Decrypted::Plaintext`] on success. Anything else — a value
/// without the `v1.` framing, a wrong key, tampered ciphertext, or
/// non-UTF-8 plaintext — yields [`Decrypted::Unchanged`] carrying the input
/// verbatim. This function does not fail.
pub fn decrypt_text(text: &str, session_key: &str) -> Decrypted {
    if text.is_empty() {
        return Decrypted::Unchanged(text.to_owned());
    }

    match try_decrypt(text, session_key) {
        Ok(plaintext) => Decrypted::Plaintext(plaintext),
        Err(CipherError::InvalidFormat) => Decrypted::Unchanged(text.to_owned()),
        Err(e) => {
            warn!(error = %e, "field decryption failed; returning stored value");
            Decrypted::Unchanged(text.to_owned())
        }
    }
}

fn try_decrypt(text: &str, session_key: &str) -> Result<String, CipherError> {
    let parsed = EncryptedText::from_str(text)?;
    let cipher = build_cipher(session_key);
    let nonce = Nonce::from_slice(&parsed.nonce);
    let plaintext = cipher
        .decrypt(nonce, parsed.ciphertext.as_ref())
        .map_err(|_| CipherError::AeadFailure)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test-session-key";

    #[test]
    fn encrypt_decrypt_round_trip() {
        let encrypted = encrypt_text("Dinner at the pier", KEY);
        assert!(encrypted.starts_with("v1."));
        let decrypted = decrypt_text(&encrypted, KEY);
        assert_eq!(decrypted, Decrypted::Plaintext("Dinner at the pier".into()));
    }

    #[test]
    fn empty_input_is_identity() {
        assert_eq!(encrypt_text("", KEY), "");
        assert!(decrypt_text("", KEY).is_unchanged());
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let encrypted = encrypt_text("Sarah", KEY);
        assert_ne!(encrypted, "Sarah");
        assert!(!encrypted.contains("Sarah"));
    }

    #[test]
    fn fresh_nonce_per_call() {
        let a = encrypt_text("same input", KEY);
        let b = encrypt_text("same input", KEY);
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_returns_input_unchanged() {
        let encrypted = encrypt_text("secret plan", KEY);
        let result = decrypt_text(&encrypted, "another-key");
        assert_eq!(result, Decrypted::Unchanged(encrypted));
    }

    #[test]
    fn garbage_returns_garbage_unchanged() {
        let result = decrypt_text("not ciphertext at all", KEY);
        assert_eq!(result, Decrypted::Unchanged("not ciphertext at all".into()));
    }

    #[test]
    fn tampered_ciphertext_returns_input_unchanged() {
        let encrypted = encrypt_text("tamper me", KEY);
        // Flip a character in the ciphertext section.
        let mut chars: Vec<char> = encrypted.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(decrypt_text(&tampered, KEY).is_unchanged());
    }

    #[test]
    fn bad_prefix_is_unchanged() {
        assert!(decrypt_text("v2.abc.def", KEY).is_unchanged());
    }

    #[test]
    fn too_few_parts_is_unchanged() {
        assert!(decrypt_text("v1.abc", KEY).is_unchanged());
    }

    #[test]
    fn unicode_round_trip() {
        let encrypted = encrypt_text("Пикник в парке 🌸", KEY);
        assert_eq!(
            decrypt_text(&encrypted, KEY),
            Decrypted::Plaintext("Пикник в парке 🌸".into())
        );
    }

    #[test]
    fn derive_key_is_stable() {
        assert_eq!(derive_key("k"), derive_key("k"));
        assert_ne!(derive_key("k"), derive_key("K"));
    }
}
