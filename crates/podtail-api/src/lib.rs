//! HTTP surface for podtail
//!
//! Axum router exposing the streaming logs endpoint behind a shared-secret
//! gate, plus an unauthenticated health probe.

mod auth;
mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::ApiState;
