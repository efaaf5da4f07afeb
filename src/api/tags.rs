//! Tag API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::common::{CreatedResponse, JsonBody, MessageResponse};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Tag;
use crate::services::TagInput;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tags))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tag))
        .route("/{id}", delete(delete_tag))
}

/// GET /api/tags
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tag_service.list().await?))
}

/// POST /api/tags
async fn create_tag(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TagInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let tag = state.tag_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Tag created successfully",
            id: tag.id,
        }),
    ))
}

/// DELETE /api/tags/{id}
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.tag_service.delete(&id).await?;
    Ok(MessageResponse::new("Tag deleted successfully"))
}
