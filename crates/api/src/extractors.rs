//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use polling_common::AppError;
use polling_core::Identity;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// Optional authenticated caller, as resolved by the auth middleware.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

impl MaybeAuthUser {
    /// Whether the caller is an authenticated administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|identity| identity.is_admin)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}

/// JSON body whose parse failures are reported as validation errors.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::Validation(rejection.body_text()))
    }
}

/// Query string whose parse failures are reported as validation errors.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| AppError::Validation(rejection.body_text()))
    }
}

/// Numeric id from the path. Anything that does not parse names no object.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|rejection| AppError::NotFound(rejection.body_text()))
    }
}

/// Unwrap a field every representation must carry.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::field(field, "This field is required."))
}

/// Keep an explicit `null` apart from an absent field.
///
/// Use with `#[serde(default)]`: absent is `None`, `null` is `Some(None)`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
