use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opsboard_core::BoardError;
use serde_json::json;

/// A `BoardError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BoardError);

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BoardError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            BoardError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BoardError::Forbidden { .. } => StatusCode::FORBIDDEN,
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BoardError::Connection(_)
            | BoardError::Io(_)
            | BoardError::Serialization(_)
            | BoardError::Database(_)
            | BoardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            BoardError::Validation { message, fields } => json!({
                "status": false,
                "message": message,
                "errors": fields,
            }),
            BoardError::Forbidden {
                message,
                force_logout: true,
            } => json!({
                "status": false,
                "message": message,
                "force_logout": true,
            }),
            BoardError::Forbidden { message, .. }
            | BoardError::BusinessRule(message)
            | BoardError::NotFound(message)
            | BoardError::Unauthorized(message) => json!({
                "status": false,
                "message": message,
            }),
            other => {
                tracing::error!(error = %other, "unhandled error while serving request");
                json!({
                    "status": false,
                    "message": "Something went wrong. Please try again later.",
                })
            }
        };
        (status, Json(body)).into_response()
    }
}
