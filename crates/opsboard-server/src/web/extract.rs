use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, OptionalFromRequest, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use opsboard_core::BoardError;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// `Json` whose rejections come back as 422 in the API's error shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(reject_body(rejection))),
        }
    }
}

/// A request without a JSON content type yields `None`.
impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        match <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await {
            Ok(value) => Ok(value.map(|Json(value)| ApiJson(value))),
            Err(rejection) => Err(ApiError(reject_body(rejection))),
        }
    }
}

fn reject_body(rejection: JsonRejection) -> BoardError {
    let message = rejection.body_text();
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            BoardError::invalid_field("body", "Expected a JSON request body.")
        }
        _ => BoardError::invalid_field("body", message),
    }
}

/// `Path` where an id that does not parse is simply not found.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(ApiError(reject_path(rejection))),
        }
    }
}

fn reject_path(rejection: PathRejection) -> BoardError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(_) => {
            tracing::debug!(reason = %rejection.body_text(), "unparseable path parameter");
            BoardError::not_found("Resource")
        }
        other => BoardError::Internal(other.body_text()),
    }
}

/// `Query` whose rejections come back as 422 against the `query` field.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(ApiError(reject_query(rejection))),
        }
    }
}

fn reject_query(rejection: QueryRejection) -> BoardError {
    BoardError::invalid_field("query", rejection.body_text())
}
