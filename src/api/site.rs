//! Public site pages
//!
//! Server-rendered HTML for readers:
//! - GET / - Published blogs, paged, with an optional category filter
//! - GET /blog/{slug} - A published blog with its approved comments
//! - GET /contact - Contact form
//!
//! Comment and contact forms post to the JSON API from the browser.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::AppState;
use crate::services::{BlogListQuery, BlogServiceError};

/// Blogs per page on the home page
pub const HOME_PAGE_SIZE: u32 = 9;

/// Home page query. Values that do not parse fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub page: Option<String>,
    pub category: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/blog/{slug}", get(blog_page))
        .route("/contact", get(contact_page))
}

/// GET /
async fn home_page(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Response {
    let page = query.page.as_deref().and_then(|p| p.parse::<u32>().ok());
    let category = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let list = state
        .blog_service
        .list(&BlogListQuery {
            page,
            limit: Some(HOME_PAGE_SIZE),
            status: Some("published".to_string()),
            category: category.clone(),
        })
        .await;
    let result = match list {
        Ok(result) => result,
        Err(e) => return server_error(e),
    };
    let categories = match state.category_service.list().await {
        Ok(categories) => categories,
        Err(e) => return server_error(e),
    };

    let mut context = base_context(&state);
    context.insert("pagination", &result.pagination());
    context.insert("blogs", &result.items);
    context.insert("categories", &categories);
    context.insert("category", &category);
    render(&state, "index.html", &context, StatusCode::OK)
}

/// GET /blog/{slug}
///
/// Drafts are not shown on the public site.
async fn blog_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let detail = match state.blog_service.get_detail(&slug).await {
        Ok(detail) if detail.blog.is_published() => detail,
        Ok(_) | Err(BlogServiceError::NotFound) => return not_found_page(&state),
        Err(e) => return server_error(e),
    };

    let mut context = base_context(&state);
    context.insert("blog", &detail.blog);
    context.insert("comments", &detail.comments);
    render(&state, "blog.html", &context, StatusCode::OK)
}

/// GET /contact
async fn contact_page(State(state): State<AppState>) -> Response {
    render(&state, "contact.html", &base_context(&state), StatusCode::OK)
}

/// Rendered 404 page for unknown site paths
pub fn not_found_page(state: &AppState) -> Response {
    render(state, "404.html", &base_context(state), StatusCode::NOT_FOUND)
}

fn base_context(state: &AppState) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("site", &state.config.site);
    context.insert("year", &Utc::now().year());
    context
}

fn render(state: &AppState, template: &str, context: &TeraContext, status: StatusCode) -> Response {
    match state.templates.render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => server_error(e),
    }
}

fn server_error(err: impl std::fmt::Display) -> Response {
    tracing::error!("Failed to render page: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>500 Internal Server Error</h1>".to_string()),
    )
        .into_response()
}
