//! Contact message API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{CreatedResponse, JsonBody, MessageResponse, QueryParams, StatusInput};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Contact;
use crate::services::ContactInput;

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_contact))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contacts))
        .route("/{id}/status", patch(update_contact_status))
        .route("/{id}", delete(delete_contact))
}

/// POST /api/contacts
async fn create_contact(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ContactInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let contact = state.contact_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Contact message sent successfully",
            id: contact.id,
        }),
    ))
}

/// GET /api/contacts?status=
async fn list_contacts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ContactListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(
        state.contact_service.list(query.status.as_deref()).await?,
    ))
}

/// PATCH /api/contacts/{id}/status
async fn update_contact_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StatusInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .contact_service
        .update_status(&id, input.status.as_deref())
        .await?;
    Ok(MessageResponse::new("Contact status updated successfully"))
}

/// DELETE /api/contacts/{id}
async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.contact_service.delete(&id).await?;
    Ok(MessageResponse::new("Contact deleted successfully"))
}
