//! API endpoints.

mod answers;
mod auth;
pub mod docs;
mod polls;
mod questions;
mod root;

use axum::{Router, middleware};

use crate::middleware::{AppState, auth_middleware};

/// Create the API router.
///
/// Resource routes sit behind bearer authentication; the root, token and
/// documentation routes do not.
pub fn router(state: &AppState) -> Router<AppState> {
    let resources = Router::new()
        .merge(polls::router())
        .merge(questions::router())
        .merge(answers::router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(root::router())
        .merge(auth::router())
        .merge(docs::router())
        .merge(resources)
}
