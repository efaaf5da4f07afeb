//! Embedded admin interface
//!
//! The admin single-page app is compiled into the binary from `web/admin/`
//! and served under `/admin`. Unknown paths below `/admin` fall back to
//! `index.html` so client-side routing keeps working on reload.

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embedded admin files
#[derive(RustEmbed)]
#[folder = "web/admin/"]
#[include = "*"]
struct AdminAssets;

/// Serve `/admin` and everything below it
pub async fn serve_admin(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches("/admin").trim_start_matches('/');

    if !path.is_empty() {
        if let Some(content) = AdminAssets::get(path) {
            return build_response(path, content.data.into_owned());
        }
    }

    match AdminAssets::get("index.html") {
        Some(content) => build_response("index.html", content.data.into_owned()),
        None => (StatusCode::NOT_FOUND, "Admin interface not bundled").into_response(),
    }
}

/// Build HTTP response with proper headers
fn build_response(path: &str, data: Vec<u8>) -> Response {
    let content_type = get_content_type(path);
    let cache_control = if content_type.starts_with("text/html") {
        "no-cache"
    } else {
        "public, max-age=3600"
    };

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
        ],
        Body::from(data),
    )
        .into_response()
}

/// Get content type from file extension
fn get_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
