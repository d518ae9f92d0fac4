//! Poll endpoints.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use chrono::{Local, NaiveDate};
use polling_common::{AppError, AppResult};
use polling_core::{Audience, PollInput};
use polling_db::entities::poll;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{JsonBody, MaybeAuthUser, PathId, explicit_null, required},
    middleware::AppState,
    permissions::{Resource, enforce},
    response::{Created, Deleted},
};

/// Poll representation.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
}

impl From<poll::Model> for PollResponse {
    fn from(poll: poll::Model) -> Self {
        Self {
            id: poll.id,
            title: poll.title,
            start_date: poll.start_date,
            end_date: poll.end_date,
            description: poll.description,
        }
    }
}

/// Poll request body.
#[derive(Debug, Deserialize)]
pub struct PollRequest {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
}

impl PollRequest {
    fn into_input(self) -> AppResult<PollInput> {
        let description = match self.description {
            Some(None) => {
                return Err(AppError::field("description", "This field may not be null."));
            }
            Some(Some(text)) => text,
            None => String::new(),
        };

        Ok(PollInput {
            title: required(self.title, "title")?,
            start_date: required(self.start_date, "start_date")?,
            end_date: required(self.end_date, "end_date")?,
            description,
        })
    }
}

/// Date used to decide which polls are active.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn list(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PollResponse>>> {
    let polls = state
        .poll_service
        .list(Audience::for_admin(caller.is_admin()), today())
        .await?;
    Ok(Json(polls.into_iter().map(Into::into).collect()))
}

async fn retrieve(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<PollResponse>> {
    let poll = state
        .poll_service
        .get(id, Audience::for_admin(caller.is_admin()), today())
        .await?;
    Ok(Json(poll.into()))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<PollRequest>,
) -> AppResult<Created<PollResponse>> {
    let poll = state.poll_service.create(req.into_input()?).await?;
    Ok(Created(poll.into()))
}

async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<PollRequest>,
) -> AppResult<Json<PollResponse>> {
    let poll = state.poll_service.update(id, req.into_input()?).await?;
    Ok(Json(poll.into()))
}

async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> AppResult<Deleted> {
    state.poll_service.delete(id).await?;
    Ok(Deleted)
}

/// Create the polls router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/polls/", get(list).post(create))
        .route("/polls/{id}/", get(retrieve).put(update).delete(destroy))
        .route_layer(middleware::from_fn_with_state(Resource::Polls, enforce))
}
