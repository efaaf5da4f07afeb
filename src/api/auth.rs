//! Authentication API endpoints
//!
//! - POST /api/auth/login - Exchange credentials for a bearer token
//! - GET /api/auth/me - Current user
//! - POST /api/auth/logout - Client-side logout acknowledgement

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Serialize;

use crate::api::common::{JsonBody, MessageResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::UserProfile;
use crate::services::{LoginInput, LoginResult};

/// Response for `GET /auth/me`
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// Routes reachable without a token
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Routes behind `require_auth`
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<LoginResult>, ApiError> {
    Ok(Json(state.user_service.login(input).await?))
}

/// GET /api/auth/me
async fn me(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: user.0.profile(),
    })
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
async fn logout(_user: AuthenticatedUser) -> Json<MessageResponse> {
    MessageResponse::new("Logged out successfully")
}
