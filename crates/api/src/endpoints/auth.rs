//! Token endpoints.

use axum::{Json, Router, extract::State, routing::post};
use polling_common::AppResult;
use polling_core::{AccessToken, TokenPair};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{JsonBody, required},
    middleware::AppState,
};

/// Credentials for a token pair.
#[derive(Debug, Deserialize)]
pub struct ObtainPairRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Refresh token exchange.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Token to check.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

/// Outcome of a successful check.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

async fn obtain_pair(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ObtainPairRequest>,
) -> AppResult<Json<TokenPair>> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;
    let pair = state.auth_service.obtain_pair(&username, &password).await?;
    Ok(Json(pair))
}

async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let token = required(req.refresh, "refresh")?;
    Ok(Json(state.auth_service.refresh(&token).await?))
}

async fn verify(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let token = required(req.token, "token")?;
    state.auth_service.verify(&token)?;
    Ok(Json(VerifyResponse { valid: true }))
}

/// Create the token router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token/", post(obtain_pair))
        .route("/token/refresh/", post(refresh))
        .route("/token/verify/", post(verify))
}
