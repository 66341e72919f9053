use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use opsboard_domain::{BoardCard, BoardList, BoardOperations, ListId, NewCard};
use serde::Deserialize;
use std::sync::Arc;

use crate::web::auth::CurrentUser;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::models::{ApiResponse, Deleted};
use crate::web::{ApiError, AppState};

#[derive(Deserialize)]
pub struct RenameListRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct MoveListRequest {
    position: i64,
}

async fn rename_list_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(payload): ApiJson<RenameListRequest>,
) -> Result<Json<ApiResponse<BoardList>>, ApiError> {
    let list = state
        .workspace
        .mutate("rename list", |s| s.rename_list(&user, list_id, payload.name))
        .await?;
    Ok(ApiResponse::ok(list))
}

async fn delete_list_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(list_id): ApiPath<ListId>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    state
        .workspace
        .mutate("delete list", |s| s.delete_list(&user, list_id))
        .await?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}

/// Returns the board's lists in their new order.
async fn move_list_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(payload): ApiJson<MoveListRequest>,
) -> Result<Json<ApiResponse<Vec<BoardList>>>, ApiError> {
    let lists = state
        .workspace
        .mutate("move list", |s| s.move_list(&user, list_id, payload.position))
        .await?;
    Ok(ApiResponse::ok(lists))
}

async fn create_card_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(payload): ApiJson<NewCard>,
) -> Result<(StatusCode, Json<ApiResponse<BoardCard>>), ApiError> {
    let card = state
        .workspace
        .mutate("create card", |s| s.create_card(&user, list_id, payload))
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(card)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/lists/{id}",
            put(rename_list_handler).delete(delete_list_handler),
        )
        .route("/lists/{id}/move", post(move_list_handler))
        .route("/lists/{id}/cards", post(create_card_handler))
}
