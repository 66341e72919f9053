use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use opsboard_domain::{
    Activity, Board, BoardDetail, BoardId, BoardList, BoardOperations, CityId, FeedQuery,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::web::auth::CurrentUser;
use crate::web::extract::{ApiJson, ApiPath, ApiQuery};
use crate::web::models::{ApiResponse, Deleted};
use crate::web::{ApiError, AppState};

#[derive(Deserialize)]
pub struct CreateBoardRequest {
    city_id: CityId,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateListRequest {
    name: String,
}

async fn list_boards_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Board>>>, ApiError> {
    let boards = state.workspace.read(|s| s.list_boards(&user)).await?;
    Ok(ApiResponse::ok(boards))
}

async fn create_board_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Board>>), ApiError> {
    let board = state
        .workspace
        .mutate("create board", |s| {
            s.create_board(&user, payload.city_id, payload.name, payload.description)
        })
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(board)))
}

async fn get_board_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(board_id): ApiPath<BoardId>,
) -> Result<Json<ApiResponse<BoardDetail>>, ApiError> {
    let detail = state
        .workspace
        .read(|s| s.board_detail(&user, board_id))
        .await?;
    Ok(ApiResponse::ok(detail))
}

async fn delete_board_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(board_id): ApiPath<BoardId>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    state
        .workspace
        .mutate("delete board", |s| s.delete_board(&user, board_id))
        .await?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}

async fn board_activities_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(board_id): ApiPath<BoardId>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> Result<Json<ApiResponse<Vec<Activity>>>, ApiError> {
    let feed = state
        .workspace
        .read(|s| s.board_activities(&user, board_id, query))
        .await?;
    Ok(ApiResponse::ok(feed))
}

async fn create_list_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(board_id): ApiPath<BoardId>,
    ApiJson(payload): ApiJson<CreateListRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BoardList>>), ApiError> {
    let list = state
        .workspace
        .mutate("create list", |s| s.create_list(&user, board_id, payload.name))
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(list)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/boards", get(list_boards_handler).post(create_board_handler))
        .route(
            "/boards/{id}",
            get(get_board_handler).delete(delete_board_handler),
        )
        .route("/boards/{id}/activities", get(board_activities_handler))
        .route("/boards/{id}/lists", post(create_list_handler))
}
