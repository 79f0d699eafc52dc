//! Invitation core: the encryption and persistence subsystem behind the
//! date-night invitation app.
//!
//! The pieces, leaf-first:
//! - [`key::KeyProvider`] resolves the session encryption key from the key
//!   server (falling back to a fixed public key) and caches it process-wide.
//! - [`crypto`] encrypts and decrypts individual text fields, never raising:
//!   a value that cannot be decrypted passes through unchanged.
//! - [`codec::InvitationCodec`] fans the cipher out across the sensitive
//!   invitation fields and translates between storage and display schemas.
//! - [`store::Store`] persists records to the remote relational store or,
//!   in demo mode, to local JSON files and self-contained links, enforcing
//!   record expiry in every lookup path.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod key;
pub mod model;
pub mod store;

pub use config::ClientConfig;
pub use key::KeyProvider;
pub use model::{Invitation, NewInvitation, RsvpStatus, StoredInvitation};
pub use store::{Store, StoreError, StoreMode};
