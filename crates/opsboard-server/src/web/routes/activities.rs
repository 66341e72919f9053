use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use opsboard_core::BoardError;
use opsboard_domain::{Activity, ActivityId, Attachment, BoardOperations, CardId, FeedQuery};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::web::auth::CurrentUser;
use crate::web::extract::{ApiJson, ApiPath, ApiQuery};
use crate::web::models::ApiResponse;
use crate::web::{ApiError, AppState};

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    attachment: Option<Attachment>,
}

async fn card_feed_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> Result<Json<ApiResponse<Vec<Activity>>>, ApiError> {
    let feed = state
        .workspace
        .read(|s| s.card_activities(&user, card_id, query))
        .await?;
    Ok(ApiResponse::ok(feed))
}

async fn add_comment_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Activity>>), ApiError> {
    let activity = state
        .workspace
        .mutate("add comment", |s| {
            s.add_comment(&user, card_id, payload.comment, payload.attachment)
        })
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(activity)))
}

/// Resolve a stored attachment path below `root`, refusing anything that
/// would land outside it.
fn resolve_attachment(root: &Path, relative: &str) -> Result<PathBuf, BoardError> {
    let root = root
        .canonicalize()
        .map_err(|_| BoardError::not_found("Attachment storage"))?;
    let full = root
        .join(relative)
        .canonicalize()
        .map_err(|_| BoardError::not_found("Attachment file"))?;
    if !full.starts_with(&root) {
        tracing::warn!(path = relative, "attachment path escapes the attachment root");
        return Err(BoardError::not_found("Attachment file"));
    }
    Ok(full)
}

async fn download_attachment_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<Arc<AppState>>,
    ApiPath(activity_id): ApiPath<ActivityId>,
) -> Result<Response, ApiError> {
    let activity = state
        .workspace
        .read(|s| s.get_activity(&user, activity_id))
        .await?;
    let attachment = activity
        .attachment
        .ok_or_else(|| BoardError::not_found("Attachment"))?;
    let root = state
        .config
        .attachment_root
        .as_deref()
        .ok_or_else(|| BoardError::not_found("Attachment storage"))?;

    let path = resolve_attachment(root, &attachment.path)?;
    let bytes = tokio::fs::read(&path).await.map_err(BoardError::from)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.name.replace(['"', '\\', '\r', '\n'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/cards/{id}/activities",
            get(card_feed_handler).post(add_comment_handler),
        )
        .route("/activities/{id}/attachment", get(download_attachment_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_attachment_stays_in_root() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("attachments");
        std::fs::create_dir_all(root.join("cards")).unwrap();
        std::fs::write(root.join("cards/passport.pdf"), b"%PDF").unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"x").unwrap();

        assert!(resolve_attachment(&root, "cards/passport.pdf").is_ok());
        assert!(resolve_attachment(&root, "../secret.txt").is_err());
        assert!(resolve_attachment(&root, "cards/missing.pdf").is_err());
    }
}
