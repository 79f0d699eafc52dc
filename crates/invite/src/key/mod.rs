//! Session key retrieval and caching.

pub mod provider;

pub use provider::KeyProvider;
