//! API layer - HTTP handlers and routing
//!
//! This module contains every HTTP endpoint:
//! - JSON API under `/api` (auth, blogs, categories, tags, comments,
//!   contacts, dashboard, health)
//! - Uploaded images under `/uploads`
//! - The embedded admin interface under `/admin`
//! - Server-rendered public pages

pub mod auth;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod common;
pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod middleware;
pub mod site;
pub mod static_files;
pub mod tags;

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    services::ServeDir, trace::TraceLayer,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser, ErrorBody};

/// Build the `/api` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/blogs", blogs::admin_router(&state.config.upload))
        .nest("/categories", categories::admin_router())
        .nest("/tags", tags::admin_router())
        .nest("/comments", comments::admin_router())
        .nest("/contacts", contacts::admin_router())
        .nest("/dashboard", dashboard::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/blogs", blogs::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
        .nest("/comments", comments::router())
        .nest("/contacts", contacts::router())
        .nest("/health", health::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let uploads = ServeDir::new(&state.config.upload.path);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .nest_service("/uploads", uploads)
        .route("/admin", get(static_files::serve_admin))
        .route("/admin/", get(static_files::serve_admin))
        .route("/admin/{*path}", get(static_files::serve_admin))
        .merge(site::router())
        .fallback(not_found)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// CORS for the configured origins, with credentials.
///
/// A wildcard cannot be combined with credentials, so `*` is dropped like any
/// other unusable origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(_) if origin.trim() == "*" => {
                tracing::warn!("Ignoring wildcard CORS origin; credentials are allowed");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// JSON 404 under `/api`, rendered page elsewhere
async fn not_found(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    if uri.path() == "/api" || uri.path().starts_with("/api/") {
        return ApiError::not_found("Route not found").into_response();
    }
    site::not_found_page(&state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
