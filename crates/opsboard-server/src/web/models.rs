use axum::Json;
use serde::Serialize;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { status: true, data })
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}
