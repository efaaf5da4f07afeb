//! Dashboard API endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::models::DashboardStats;

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/dashboard/stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard_service.stats().await?))
}
