//! API middleware and shared request state
//!
//! Contains:
//! - `AppState`, the service handles every handler receives
//! - `ApiError`, the single error type rendered as `{"error": message}`
//! - Authentication (bearer token resolution) and admin authorization
//!   as composable route layers

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    SqlxBlogRepository, SqlxCategoryRepository, SqlxCommentRepository, SqlxContactRepository,
    SqlxDashboardRepository, SqlxTagRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{
    BlogService, BlogServiceError, CategoryService, CategoryServiceError, CommentService,
    CommentServiceError, ContactService, ContactServiceError, DashboardService, ImageStore,
    TagService, TagServiceError, TokenService, UploadError, UserService, UserServiceError,
};
use crate::theme::TemplateEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_service: Arc<UserService>,
    pub blog_service: Arc<BlogService>,
    pub category_service: Arc<CategoryService>,
    pub tag_service: Arc<TagService>,
    pub comment_service: Arc<CommentService>,
    pub contact_service: Arc<ContactService>,
    pub dashboard_service: Arc<DashboardService>,
    pub templates: Arc<TemplateEngine>,
}

impl AppState {
    /// Wire repositories and services on top of an open pool
    pub fn new(pool: DynDatabasePool, config: Config) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::from_config(&config.auth));
        let images = Arc::new(ImageStore::new(config.upload.clone()));

        let blog_repo = SqlxBlogRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        Ok(Self {
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                tokens,
            )),
            blog_service: Arc::new(BlogService::new(
                blog_repo.clone(),
                comment_repo.clone(),
                images,
            )),
            category_service: Arc::new(CategoryService::new(SqlxCategoryRepository::boxed(
                pool.clone(),
            ))),
            tag_service: Arc::new(TagService::new(SqlxTagRepository::boxed(pool.clone()))),
            comment_service: Arc::new(CommentService::new(comment_repo, blog_repo)),
            contact_service: Arc::new(ContactService::new(SqlxContactRepository::boxed(
                pool.clone(),
            ))),
            dashboard_service: Arc::new(DashboardService::new(SqlxDashboardRepository::boxed(pool))),
            templates: Arc::new(TemplateEngine::new()?),
            config: Arc::new(config),
        })
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Access token required"))
    }
}

/// Error returned by every API handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Wire shape of an error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Log the detail and hide it from the client
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {:#}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::ValidationError(_) | UserServiceError::UserExists(_) => {
                Self::validation_error(err.to_string())
            }
            UserServiceError::InvalidCredentials | UserServiceError::InvalidToken => {
                Self::unauthorized(err.to_string())
            }
            UserServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => Self::internal_error(e),
            other => Self::validation_error(other.to_string()),
        }
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(err: BlogServiceError) -> Self {
        match err {
            BlogServiceError::ValidationError(_) | BlogServiceError::DuplicateTitle => {
                Self::validation_error(err.to_string())
            }
            BlogServiceError::NotFound => Self::not_found(err.to_string()),
            BlogServiceError::Upload(e) => e.into(),
            BlogServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::ValidationError(_) | CategoryServiceError::DuplicateName => {
                Self::validation_error(err.to_string())
            }
            CategoryServiceError::NotFound => Self::not_found(err.to_string()),
            CategoryServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<TagServiceError> for ApiError {
    fn from(err: TagServiceError) -> Self {
        match err {
            TagServiceError::ValidationError(_) | TagServiceError::DuplicateName => {
                Self::validation_error(err.to_string())
            }
            TagServiceError::NotFound => Self::not_found(err.to_string()),
            TagServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::ValidationError(_) => Self::validation_error(err.to_string()),
            CommentServiceError::BlogNotFound | CommentServiceError::NotFound => {
                Self::not_found(err.to_string())
            }
            CommentServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<ContactServiceError> for ApiError {
    fn from(err: ContactServiceError) -> Self {
        match err {
            ContactServiceError::ValidationError(_) => Self::validation_error(err.to_string()),
            ContactServiceError::NotFound => Self::not_found(err.to_string()),
            ContactServiceError::InternalError(e) => Self::internal_error(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_error(err)
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
///
/// Resolves the bearer token to a user and stores it in the request
/// extensions for `require_admin` and the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?
        .to_string();

    let user = state.user_service.authenticate(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware. Must run after `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    if !user.0.is_admin() {
        tracing::debug!(user_id = %user.0.id, "Rejected non-admin request");
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = request_with_auth("Bearer test-token-123");
        assert_eq!(extract_bearer_token(&request), Some("test-token-123"));
    }

    #[test]
    fn test_extract_bearer_token_none() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_schemes() {
        assert!(extract_bearer_token(&request_with_auth("Basic abc")).is_none());
        assert!(extract_bearer_token(&request_with_auth("Bearer ")).is_none());
        assert!(extract_bearer_token(&request_with_auth("bearer abc")).is_none());
    }

    #[test]
    fn test_service_errors_map_to_status() {
        let cases: Vec<(ApiError, StatusCode, &str)> = vec![
            (
                BlogServiceError::DuplicateTitle.into(),
                StatusCode::BAD_REQUEST,
                "A blog with this title already exists",
            ),
            (BlogServiceError::NotFound.into(), StatusCode::NOT_FOUND, "Blog not found"),
            (
                CommentServiceError::BlogNotFound.into(),
                StatusCode::NOT_FOUND,
                "Blog not found",
            ),
            (
                UserServiceError::InvalidCredentials.into(),
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
            ),
            (
                CategoryServiceError::ValidationError("No fields to update".into()).into(),
                StatusCode::BAD_REQUEST,
                "No fields to update",
            ),
            (
                UploadError::TooLarge { max_mb: 5 }.into(),
                StatusCode::BAD_REQUEST,
                "File too large. Maximum size is 5 MB",
            ),
        ];

        for (error, status, message) in cases {
            assert_eq!(error.status, status);
            assert_eq!(error.message, message);
        }
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let error: ApiError =
            TagServiceError::InternalError(anyhow::anyhow!("disk I/O error at /var/db")).into();
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Internal server error");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use axum::body::Body;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn bearer_token_round_trips(token in "[A-Za-z0-9._-]{1,64}") {
            let request = Request::builder()
                .uri("/test")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap();
            prop_assert_eq!(extract_bearer_token(&request), Some(token.as_str()));
        }
    }
}
