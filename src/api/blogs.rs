//! Blog API endpoints
//!
//! Handles HTTP requests for blog posts:
//! - GET /api/blogs - Paged list with status and category filters
//! - GET /api/blogs/{slug} - Detail with approved comments
//! - POST /api/blogs - Create from a multipart form (admin)
//! - PUT /api/blogs/{id} - Partial update from a multipart form (admin)
//! - DELETE /api/blogs/{id} - Delete (admin)
//!
//! Create and update accept `multipart/form-data` so the featured image can
//! travel with the text fields. `tags` is a JSON array of tag ids.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::common::{MessageResponse, QueryParams};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::config::UploadConfig;
use crate::models::{Blog, BlogDetail};
use crate::services::{BlogForm, BlogListQuery, ImageUpload};
use crate::utils::Pagination;

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "featured_image";

/// Headroom for the text fields on top of the image size limit
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Response for the blog list
#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub blogs: Vec<Blog>,
    pub pagination: Pagination,
}

/// Response for a created blog
#[derive(Debug, Serialize)]
pub struct BlogCreatedResponse {
    pub message: &'static str,
    pub id: String,
    pub slug: String,
}

/// Public routes
///
/// The detail route shares the `{id}` segment with the admin routes; on GET
/// it carries the slug.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs))
        .route("/{id}", get(get_blog))
}

/// Routes behind `require_admin`
pub fn admin_router(upload: &UploadConfig) -> Router<AppState> {
    let body_limit = usize::try_from(upload.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/", post(create_blog))
        .route("/{id}", axum::routing::put(update_blog).delete(delete_blog))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// GET /api/blogs?page=&limit=&status=&category=
async fn list_blogs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<BlogListQuery>,
) -> Result<Json<BlogListResponse>, ApiError> {
    let result = state.blog_service.list(&query).await?;
    let pagination = result.pagination();

    Ok(Json(BlogListResponse {
        blogs: result.items,
        pagination,
    }))
}

/// GET /api/blogs/{slug}
async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogDetail>, ApiError> {
    Ok(Json(state.blog_service.get_detail(&slug).await?))
}

/// POST /api/blogs
async fn create_blog(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<BlogCreatedResponse>), ApiError> {
    let form = read_blog_form(multipart).await?;
    let blog = state.blog_service.create(form, &user.0.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(BlogCreatedResponse {
            message: "Blog created successfully",
            id: blog.id,
            slug: blog.slug,
        }),
    ))
}

/// PUT /api/blogs/{id}
async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let form = read_blog_form(multipart).await?;
    state.blog_service.update(&id, form).await?;
    Ok(MessageResponse::new("Blog updated successfully"))
}

/// DELETE /api/blogs/{id}
async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.blog_service.delete(&id).await?;
    Ok(MessageResponse::new("Blog deleted successfully"))
}

/// Collect the multipart fields into a `BlogForm`.
///
/// Unknown fields are skipped. A file part with no name and no bytes is
/// what browsers send for an empty file input and counts as "no image".
async fn read_blog_form(mut multipart: Multipart) -> Result<BlogForm, ApiError> {
    let mut form = BlogForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            if file_name.as_deref().unwrap_or_default().is_empty() && data.is_empty() {
                continue;
            }
            form.featured_image = Some(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "content" => &mut form.content,
            "excerpt" => &mut form.excerpt,
            "category_id" => &mut form.category_id,
            "status" => &mut form.status,
            "tags" => &mut form.tags,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "File too large");
    }
    tracing::debug!("Rejected multipart body: {}", err.body_text());
    ApiError::validation_error("Invalid multipart body")
}
