//! Common wire types and errors shared between the `keyserver` binary and
//! the `invite` client library.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
