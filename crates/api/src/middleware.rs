//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use polling_common::config::AuthConfig;
use polling_core::{AnswerService, AuthService, PollService, QuestionService};
use polling_db::repositories::{
    AnswerRepository, PollRepository, QuestionRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub poll_service: PollService,
    pub question_service: QuestionService,
    pub answer_service: AnswerService,
    pub auth_service: AuthService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, auth: &AuthConfig) -> Self {
        let poll_repo = PollRepository::new(Arc::clone(&db));
        let question_repo = QuestionRepository::new(Arc::clone(&db));
        let answer_repo = AnswerRepository::new(Arc::clone(&db));
        let user_repo = UserRepository::new(db);

        Self {
            poll_service: PollService::new(poll_repo.clone()),
            question_service: QuestionService::new(question_repo.clone(), poll_repo),
            answer_service: AnswerService::new(answer_repo, question_repo),
            auth_service: AuthService::new(user_repo, auth),
        }
    }
}

/// Authentication middleware.
///
/// A request without a bearer token passes through anonymously. A bearer
/// token that does not resolve to an identity is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(bearer) = req.headers().typed_get::<Authorization<Bearer>>() {
        match state.auth_service.authenticate(bearer.token()) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
            }
            Err(e) => {
                debug!(path = %req.uri().path(), "Bearer token rejected");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}
