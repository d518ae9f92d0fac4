//! Error types for polling-system.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication credentials were not provided")]
    Unauthorized,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Token is invalid or expired")]
    TokenInvalid,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure attributed to a single request field.
    pub fn field(name: &str, message: impl std::fmt::Display) -> Self {
        Self::Validation(format!("{name}: {message}"))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "NOT_AUTHENTICATED",
            Self::InvalidCredentials => "AUTHENTICATION_FAILED",
            Self::TokenInvalid => "TOKEN_NOT_VALID",
            Self::Forbidden => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Server internals stay in the log, not in the body
        let message = if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
            "A server error occurred".to_string()
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let detail = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{field}: {detail}")
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "This field may not be blank."))]
        title: String,
    }

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(
            AppError::NotFound("poll 1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_are_flagged() {
        assert!(AppError::Database("down".into()).is_server_error());
        assert!(!AppError::Forbidden.is_server_error());
    }

    #[test]
    fn test_field_error_is_prefixed() {
        let err = AppError::field("title", "This field may not be blank.");
        assert_eq!(err.to_string(), "title: This field may not be blank.");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_validation_errors_keep_custom_message() {
        let sample = Sample {
            title: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        assert_eq!(err.to_string(), "title: This field may not be blank.");
    }
}
