//! Question endpoints.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use polling_common::{AppError, AppResult};
use polling_core::QuestionInput;
use polling_db::entities::{QuestionType, question};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{JsonBody, PathId, QueryParams, required},
    middleware::AppState,
    permissions::{Resource, enforce},
    response::{Created, Deleted},
};

/// Question representation.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub poll: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

impl From<question::Model> for QuestionResponse {
    fn from(question: question::Model) -> Self {
        Self {
            id: question.id,
            poll: question.poll_id,
            text: question.text,
            question_type: question.question_type,
        }
    }
}

/// Question request body. The type travels as its two-letter code.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub poll: Option<i64>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
}

impl QuestionRequest {
    fn into_input(self) -> AppResult<QuestionInput> {
        let code = required(self.question_type, "type")?;
        let question_type = QuestionType::from_code(&code)
            .ok_or_else(|| AppError::field("type", format!("\"{code}\" is not a valid choice.")))?;

        Ok(QuestionInput {
            poll_id: required(self.poll, "poll")?,
            text: required(self.text, "text")?,
            question_type,
        })
    }
}

/// List filter.
#[derive(Debug, Deserialize)]
pub struct QuestionFilter {
    pub poll: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<QuestionFilter>,
) -> AppResult<Json<Vec<QuestionResponse>>> {
    let questions = state.question_service.list(filter.poll).await?;
    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

async fn retrieve(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<QuestionResponse>> {
    let question = state.question_service.get(id).await?;
    Ok(Json(question.into()))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<QuestionRequest>,
) -> AppResult<Created<QuestionResponse>> {
    let question = state.question_service.create(req.into_input()?).await?;
    Ok(Created(question.into()))
}

async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<QuestionRequest>,
) -> AppResult<Json<QuestionResponse>> {
    let question = state.question_service.update(id, req.into_input()?).await?;
    Ok(Json(question.into()))
}

async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> AppResult<Deleted> {
    state.question_service.delete(id).await?;
    Ok(Deleted)
}

/// Create the questions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions/", get(list).post(create))
        .route(
            "/questions/{id}/",
            get(retrieve).put(update).delete(destroy),
        )
        .route_layer(middleware::from_fn_with_state(Resource::Questions, enforce))
}
