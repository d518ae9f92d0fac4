//! API root and liveness probe.

use axum::{
    Json, Router,
    http::{HeaderMap, header::HOST},
    routing::get,
};
use serde_json::{Map, Value};

use crate::middleware::AppState;

const LINKS: [(&str, &str); 6] = [
    ("polls", "/polls/"),
    ("questions", "/questions/"),
    ("answers", "/answers/"),
    ("token_obtain_pair", "/token/"),
    ("token_refresh", "/token/refresh/"),
    ("token_verify", "/token/verify/"),
];

/// Links to every top-level resource, absolute when the request names a host.
async fn api_root(headers: HeaderMap) -> Json<Value> {
    let base = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default();

    let links: Map<String, Value> = LINKS
        .iter()
        .map(|(name, path)| ((*name).to_string(), Value::String(format!("{base}{path}"))))
        .collect();

    Json(Value::Object(links))
}

async fn health() -> &'static str {
    "OK"
}

/// Create the root router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/health", get(health))
}
