//! Comment API endpoints
//!
//! - POST /api/comments - Public submission, lands in moderation
//! - GET /api/comments - Moderation queue (admin)
//! - PATCH /api/comments/{id}/status - Approve or reject (admin)
//! - DELETE /api/comments/{id} - Delete (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};

use crate::api::common::{CreatedResponse, JsonBody, MessageResponse, QueryParams, StatusInput};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Comment;
use crate::services::{CommentInput, CommentListQuery};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_comment))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comments))
        .route("/{id}/status", patch(update_comment_status))
        .route("/{id}", delete(delete_comment))
}

/// POST /api/comments
async fn create_comment(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CommentInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let comment = state.comment_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Comment submitted for moderation",
            id: comment.id,
        }),
    ))
}

/// GET /api/comments?status=&blog_id=
async fn list_comments(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CommentListQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.comment_service.list(&query).await?))
}

/// PATCH /api/comments/{id}/status
async fn update_comment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StatusInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .comment_service
        .update_status(&id, input.status.as_deref())
        .await?;
    Ok(MessageResponse::new("Comment status updated successfully"))
}

/// DELETE /api/comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.comment_service.delete(&id).await?;
    Ok(MessageResponse::new("Comment deleted successfully"))
}
