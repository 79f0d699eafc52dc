//! Field-level encryption for sensitive invitation text.

pub mod cipher;

pub use cipher::{decrypt_text, encrypt_text, Decrypted};
