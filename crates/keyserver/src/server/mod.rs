//! HTTP server: router, state, handlers, and middleware constants.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
