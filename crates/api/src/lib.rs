//! HTTP API layer for polling-system.
//!
//! - **Endpoints**: polls, questions and answers, token issuance, schema docs
//! - **Extractors**: caller identity, JSON bodies and query strings
//! - **Middleware**: bearer authentication and the per-resource access policy
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod permissions;
pub mod response;

use axum::Router;

pub use endpoints::router;
pub use middleware::AppState;

/// The full application with its state applied.
pub fn app(state: AppState) -> Router {
    router(&state).with_state(state)
}
