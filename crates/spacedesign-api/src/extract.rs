//! Extractors that turn axum rejections into [`ApiError`]s, so malformed
//! input gets the same JSON error body as every other failure.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use spacedesign_types::api::CategoryFilter;
use spacedesign_types::validation::{self, ValidationErrors};

use crate::error::ApiError;

/// A JSON body decoded as `T` with its validation rules applied.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await.map_err(|rejection| {
            debug!("Rejected request body: {}", rejection.body_text());
            ValidationErrors::single("body", "must be a JSON document sent as application/json")
        })?;

        let parsed = validation::parse(body).inspect_err(|errors| {
            debug!("Invalid request body: {}", errors);
        })?;
        Ok(Self(parsed))
    }
}

/// An integer `{id}` path segment.
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Internal(anyhow!("id path extraction failed: {}", e)))?;

        raw.parse::<i64>()
            .map(Self)
            .map_err(|_| ValidationErrors::single("id", "must be an integer").into())
    }
}

/// A string `{id}` path segment, for client-chosen keys.
pub struct KeyPath(pub String);

impl<S> FromRequestParts<S> for KeyPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(key)) => Ok(Self(key)),
            Err(rejection) => {
                debug!("Rejected path key: {}", rejection.body_text());
                Err(ValidationErrors::single("id", "is not a valid path segment").into())
            }
        }
    }
}

/// `?category=` filter for list endpoints.
pub struct CategoryQuery(pub CategoryFilter);

impl<S> FromRequestParts<S> for CategoryQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<CategoryFilter>::from_request_parts(parts, state).await {
            Ok(Query(filter)) => Ok(Self(filter)),
            Err(rejection) => {
                debug!("Rejected query string: {}", rejection.body_text());
                Err(ValidationErrors::single("query", "is not a valid query string").into())
            }
        }
    }
}
