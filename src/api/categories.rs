//! Category API endpoints
//!
//! - GET /api/categories - All categories, alphabetical
//! - POST /api/categories - Create (admin)
//! - PUT /api/categories/{id} - Partial update (admin)
//! - DELETE /api/categories/{id} - Delete (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::api::common::{CreatedResponse, JsonBody, MessageResponse};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Category;
use crate::services::CategoryInput;

/// Public routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

/// Routes behind `require_admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Category created successfully",
            id: category.id,
        }),
    ))
}

/// PUT /api/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.category_service.update(&id, input).await?;
    Ok(MessageResponse::new("Category updated successfully"))
}

/// DELETE /api/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.category_service.delete(&id).await?;
    Ok(MessageResponse::new("Category deleted successfully"))
}
