use axum::{
    extract::{Extension, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use opsboard_domain::{
    BoardCard, BoardOperations, CardId, CardLabels, FieldUpdate, ListId, MoveOutcome,
    PaymentUpdate, UserId,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::web::auth::CurrentUser;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::models::{ApiResponse, Deleted};
use crate::web::{ApiError, AppState};

#[derive(Deserialize)]
pub struct MoveCardRequest {
    card_id: CardId,
    list_id: ListId,
    position: i64,
}

#[derive(Deserialize)]
pub struct UpdateTextRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: FieldUpdate<String>,
}

#[derive(Deserialize)]
pub struct DueDateRequest {
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct ArchiveRequest {
    #[serde(default = "archive_by_default")]
    archived: bool,
}

fn archive_by_default() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CheckedRequest {
    checked: bool,
}

#[derive(Deserialize)]
pub struct AssigneesRequest {
    assignees: Vec<UserId>,
}

async fn move_card_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<MoveCardRequest>,
) -> Result<Json<ApiResponse<MoveOutcome>>, ApiError> {
    let outcome = state
        .workspace
        .mutate("move card", |s| {
            s.move_card(&user, payload.card_id, payload.list_id, payload.position)
        })
        .await?;
    Ok(ApiResponse::ok(outcome))
}

async fn get_card_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state.workspace.read(|s| s.get_card(&user, card_id)).await?;
    Ok(ApiResponse::ok(card))
}

async fn delete_card_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    state
        .workspace
        .mutate("delete card", |s| s.delete_card(&user, card_id))
        .await?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}

async fn set_labels_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(labels): ApiJson<CardLabels>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("set labels", |s| s.set_labels(&user, card_id, labels))
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn update_text_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(payload): ApiJson<UpdateTextRequest>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("update card text", |s| {
            s.update_card_text(&user, card_id, payload.title, payload.description)
        })
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn due_date_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(payload): ApiJson<DueDateRequest>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("set due date", |s| {
            s.set_due_date(&user, card_id, payload.due_date)
        })
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn payment_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(update): ApiJson<PaymentUpdate>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("set payment", |s| s.set_payment(&user, card_id, update))
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn archive_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    payload: Option<ApiJson<ArchiveRequest>>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let archived = match payload {
        Some(ApiJson(request)) => request.archived,
        None => archive_by_default(),
    };
    let operation = if archived {
        "archive card"
    } else {
        "restore card"
    };
    let card = state
        .workspace
        .mutate(operation, |s| s.set_archived(&user, card_id, archived))
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn checked_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(payload): ApiJson<CheckedRequest>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("set checked", |s| s.set_checked(&user, card_id, payload.checked))
        .await?;
    Ok(ApiResponse::ok(card))
}

async fn assignees_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(payload): ApiJson<AssigneesRequest>,
) -> Result<Json<ApiResponse<BoardCard>>, ApiError> {
    let card = state
        .workspace
        .mutate("set assignees", |s| {
            s.set_assignees(&user, card_id, payload.assignees)
        })
        .await?;
    Ok(ApiResponse::ok(card))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cards/move", post(move_card_handler))
        .route(
            "/cards/{id}",
            get(get_card_handler).delete(delete_card_handler),
        )
        .route("/cards/{id}/labels", put(set_labels_handler))
        .route("/cards/{id}/description", put(update_text_handler))
        .route("/cards/{id}/due-date", put(due_date_handler))
        .route("/cards/{id}/payment", put(payment_handler))
        .route("/cards/{id}/archive", put(archive_handler))
        .route("/cards/{id}/checked", put(checked_handler))
        .route("/cards/{id}/assignees", put(assignees_handler))
}
