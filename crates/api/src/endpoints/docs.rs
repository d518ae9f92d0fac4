//! Machine-readable schema and interactive documentation pages.

use axum::{Json, Router, response::Html, routing::get};
use polling_db::entities::QuestionType;
use sea_orm::Iterable;
use serde_json::{Value, json};

use crate::middleware::AppState;

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Polling System API</title>
  <meta charset="utf-8"/>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({ url: "/swagger.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

const REDOC: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Polling System API</title>
  <meta charset="utf-8"/>
</head>
<body>
  <redoc spec-url="/swagger.json"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>
"#;

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
    })
}

fn id_param() -> Value {
    json!({"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}})
}

fn collection(schema: &str, params: &[Value], create_note: &str) -> Value {
    let reference = format!("#/components/schemas/{schema}");
    json!({
        "get": {
            "parameters": params,
            "responses": {
                "200": {"description": "list", "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": reference}}}}}
            }
        },
        "post": {
            "description": create_note,
            "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": reference}}}},
            "responses": {
                "201": {"description": "created", "content": {"application/json": {"schema": {"$ref": reference}}}},
                "400": error_response("validation failure"),
                "401": error_response("not authenticated"),
                "403": error_response("not permitted")
            }
        }
    })
}

fn item(schema: &str) -> Value {
    let reference = format!("#/components/schemas/{schema}");
    json!({
        "parameters": [id_param()],
        "get": {
            "responses": {
                "200": {"description": "item", "content": {"application/json": {"schema": {"$ref": reference}}}},
                "404": error_response("unknown or hidden id")
            }
        },
        "put": {
            "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": reference}}}},
            "responses": {
                "200": {"description": "updated", "content": {"application/json": {"schema": {"$ref": reference}}}},
                "400": error_response("validation failure"),
                "401": error_response("not authenticated"),
                "403": error_response("not permitted"),
                "404": error_response("unknown or hidden id")
            }
        },
        "delete": {
            "responses": {
                "204": {"description": "deleted"},
                "401": error_response("not authenticated"),
                "403": error_response("not permitted"),
                "404": error_response("unknown id")
            }
        }
    })
}

/// The OpenAPI 3 document describing this API.
#[must_use]
pub fn openapi_spec() -> Value {
    let poll_filter = json!({"name": "poll", "in": "query", "schema": {"type": "integer"}});
    let user_filter = json!({"name": "user_id", "in": "query", "schema": {"type": "integer"}});
    let type_codes: Vec<&str> = QuestionType::iter().map(QuestionType::code).collect();
    let type_labels = QuestionType::iter()
        .map(|ty| format!("{} = {}", ty.code(), ty.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut answer_item = item("Answer");
    answer_item["parameters"] = json!([id_param(), user_filter.clone()]);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Polling System API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Polls, their questions, and per-user answers."
        },
        "paths": {
            "/polls/": collection("Poll", &[], "admin only"),
            "/polls/{id}/": item("Poll"),
            "/questions/": collection("Question", &[poll_filter], "admin only"),
            "/questions/{id}/": item("Question"),
            "/answers/": collection("Answer", &[user_filter], "open to anyone"),
            "/answers/{id}/": answer_item,
            "/token/": {
                "post": {
                    "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Credentials"}}}},
                    "responses": {
                        "200": {"description": "token pair", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/TokenPair"}}}},
                        "401": error_response("bad credentials")
                    }
                }
            },
            "/token/refresh/": {
                "post": {
                    "requestBody": {"required": true, "content": {"application/json": {"schema": {"type": "object", "required": ["refresh"], "properties": {"refresh": {"type": "string"}}}}}},
                    "responses": {
                        "200": {"description": "new access token", "content": {"application/json": {"schema": {"type": "object", "properties": {"access": {"type": "string"}}}}}},
                        "401": error_response("token not valid")
                    }
                }
            },
            "/token/verify/": {
                "post": {
                    "requestBody": {"required": true, "content": {"application/json": {"schema": {"type": "object", "required": ["token"], "properties": {"token": {"type": "string"}}}}}},
                    "responses": {
                        "200": {"description": "token is valid"},
                        "401": error_response("token not valid")
                    }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "bearer": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}
            },
            "schemas": {
                "Poll": {
                    "type": "object",
                    "required": ["title", "start_date", "end_date"],
                    "properties": {
                        "id": {"type": "integer", "readOnly": true},
                        "title": {"type": "string", "maxLength": 120, "minLength": 1},
                        "start_date": {"type": "string", "format": "date"},
                        "end_date": {"type": "string", "format": "date"},
                        "description": {"type": "string"}
                    }
                },
                "Question": {
                    "type": "object",
                    "required": ["poll", "text", "type"],
                    "properties": {
                        "id": {"type": "integer", "readOnly": true},
                        "poll": {"type": "integer"},
                        "text": {"type": "string", "minLength": 1},
                        "type": {"type": "string", "enum": type_codes, "description": type_labels}
                    }
                },
                "Answer": {
                    "type": "object",
                    "required": ["user_id", "question", "answer"],
                    "properties": {
                        "id": {"type": "integer", "readOnly": true},
                        "user_id": {"type": "integer"},
                        "question": {"type": "integer"},
                        "answer": {"type": "string", "minLength": 1}
                    }
                },
                "Credentials": {
                    "type": "object",
                    "required": ["username", "password"],
                    "properties": {
                        "username": {"type": "string"},
                        "password": {"type": "string", "format": "password"}
                    }
                },
                "TokenPair": {
                    "type": "object",
                    "properties": {
                        "access": {"type": "string"},
                        "refresh": {"type": "string"}
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": {"type": "string"},
                                "message": {"type": "string"}
                            }
                        }
                    }
                }
            }
        },
        "security": [{"bearer": []}, {}]
    })
}

async fn spec() -> Json<Value> {
    Json(openapi_spec())
}

async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

async fn redoc() -> Html<&'static str> {
    Html(REDOC)
}

/// Create the documentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/swagger.json", get(spec))
        .route("/swagger/", get(swagger_ui))
        .route("/redoc/", get(redoc))
}
