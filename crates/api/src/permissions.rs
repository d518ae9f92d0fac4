//! Method-based access policy per resource.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use polling_common::AppError;
use polling_core::Identity;

/// A resource collection guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Polls,
    Questions,
    Answers,
}

/// Whether `method` on `resource` is open to a caller with this admin flag.
///
/// Admins may do anything. Polls and questions are read-only for everyone
/// else; answers are open for everything except deletion.
#[must_use]
pub fn is_allowed(resource: Resource, method: &Method, is_admin: bool) -> bool {
    if is_admin {
        return true;
    }

    let safe = matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);
    match resource {
        Resource::Polls | Resource::Questions => safe,
        Resource::Answers => safe || matches!(*method, Method::POST | Method::PUT),
    }
}

/// Apply [`is_allowed`] before the handler runs.
///
/// Anonymous callers are refused with 401, authenticated non-admins with 403.
pub async fn enforce(
    State(resource): State<Resource>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let caller = req.extensions().get::<Identity>();
    let is_admin = caller.is_some_and(|identity| identity.is_admin);

    if !is_allowed(resource, req.method(), is_admin) {
        let err = if caller.is_some() {
            AppError::Forbidden
        } else {
            AppError::Unauthorized
        };
        return err.into_response();
    }

    next.run(req).await
}
