//! Answer endpoints.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use polling_common::AppResult;
use polling_core::{AnswerInput, AnswerScope};
use polling_db::entities::answer;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{JsonBody, MaybeAuthUser, PathId, QueryParams, required},
    middleware::AppState,
    permissions::{Resource, enforce},
    response::{Created, Deleted},
};

/// Answer representation.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: i64,
    pub user_id: i64,
    pub question: i64,
    pub answer: String,
}

impl From<answer::Model> for AnswerResponse {
    fn from(answer: answer::Model) -> Self {
        Self {
            id: answer.id,
            user_id: answer.user_id,
            question: answer.question_id,
            answer: answer.answer,
        }
    }
}

/// Answer request body.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_id: Option<i64>,
    pub question: Option<i64>,
    pub answer: Option<String>,
}

impl AnswerRequest {
    fn into_input(self) -> AppResult<AnswerInput> {
        Ok(AnswerInput {
            user_id: required(self.user_id, "user_id")?,
            question_id: required(self.question, "question")?,
            answer: required(self.answer, "answer")?,
        })
    }
}

/// Ownership filter for non-admin callers.
#[derive(Debug, Deserialize)]
pub struct OwnerFilter {
    pub user_id: Option<i64>,
}

async fn list(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<OwnerFilter>,
) -> AppResult<Json<Vec<AnswerResponse>>> {
    let scope = AnswerScope::new(caller.is_admin(), filter.user_id);
    let answers = state.answer_service.list(scope).await?;
    Ok(Json(answers.into_iter().map(Into::into).collect()))
}

async fn retrieve(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    QueryParams(filter): QueryParams<OwnerFilter>,
) -> AppResult<Json<AnswerResponse>> {
    let scope = AnswerScope::new(caller.is_admin(), filter.user_id);
    let answer = state.answer_service.get(id, scope).await?;
    Ok(Json(answer.into()))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> AppResult<Created<AnswerResponse>> {
    let answer = state.answer_service.create(req.into_input()?).await?;
    Ok(Created(answer.into()))
}

/// Non-admins reach only answers of the user named in the query, or else in the body.
async fn update(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    QueryParams(filter): QueryParams<OwnerFilter>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> AppResult<Json<AnswerResponse>> {
    let scope = AnswerScope::new(caller.is_admin(), filter.user_id.or(req.user_id));
    let answer = state
        .answer_service
        .update(id, scope, req.into_input()?)
        .await?;
    Ok(Json(answer.into()))
}

async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> AppResult<Deleted> {
    state.answer_service.delete(id).await?;
    Ok(Deleted)
}

/// Create the answers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/answers/", get(list).post(create))
        .route("/answers/{id}/", get(retrieve).put(update).delete(destroy))
        .route_layer(middleware::from_fn_with_state(Resource::Answers, enforce))
}
