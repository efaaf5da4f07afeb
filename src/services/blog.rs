//! Blog service
//!
//! Implements business logic for blog posts:
//! - Paged listing with status and category filters
//! - Detail by slug with approved comments
//! - Create/update from multipart form input, including the featured image
//! - Slug derivation and `published_at` bookkeeping
//! - Delete, including the stored featured image

use crate::db::repositories::{BlogRepository, CommentRepository};
use crate::db::{is_foreign_key_violation, is_unique_violation};
use crate::models::{Blog, BlogChanges, BlogDetail, BlogFilter, BlogStatus, NewBlog};
use crate::services::upload::{ImageStore, ImageUpload, UploadError};
use crate::utils::{generate_slug, non_blank, ListParams, PagedResult};
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    ValidationError(String),

    /// Another blog already uses the derived slug
    #[error("A blog with this title already exists")]
    DuplicateTitle,

    /// Blog not found
    #[error("Blog not found")]
    NotFound,

    /// Rejected or failed image upload
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Query parameters for the blog list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    /// Category slug
    pub category: Option<String>,
}

/// Blog fields as submitted through a multipart form.
///
/// Every field is optional so the same shape serves create and update;
/// `None` means "not submitted".
#[derive(Debug, Clone, Default)]
pub struct BlogForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
    /// JSON array of tag ids
    pub tags: Option<String>,
    pub featured_image: Option<ImageUpload>,
}

/// Blog service for managing posts
pub struct BlogService {
    blog_repo: Arc<dyn BlogRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    images: Arc<ImageStore>,
}

impl BlogService {
    pub fn new(
        blog_repo: Arc<dyn BlogRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        images: Arc<ImageStore>,
    ) -> Self {
        Self {
            blog_repo,
            comment_repo,
            images,
        }
    }

    /// List blogs, newest first.
    ///
    /// # Errors
    /// - `ValidationError` for a status filter other than draft/published
    pub async fn list(&self, query: &BlogListQuery) -> Result<PagedResult<Blog>, BlogServiceError> {
        let status = match non_blank(query.status.clone()) {
            Some(status) => Some(parse_status(&status)?),
            None => None,
        };
        let filter = BlogFilter {
            status,
            category_slug: non_blank(query.category.clone()),
        };
        let params = ListParams::from_query(query.page, query.limit);

        Ok(self
            .blog_repo
            .list(&filter, &params)
            .await
            .context("Failed to list blogs")?)
    }

    /// Blog with tags and approved comments, regardless of status
    pub async fn get_detail(&self, slug: &str) -> Result<BlogDetail, BlogServiceError> {
        let blog = self
            .blog_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get blog by slug")?
            .ok_or(BlogServiceError::NotFound)?;

        let comments = self
            .comment_repo
            .list_approved_for_blog(&blog.id)
            .await
            .context("Failed to load comments")?;

        Ok(BlogDetail { blog, comments })
    }

    /// Create a blog authored by `author_id`.
    ///
    /// # Errors
    /// - `ValidationError` if title or content is missing, or status/tags are malformed
    /// - `DuplicateTitle` if the derived slug is taken
    /// - `Upload` if the featured image is rejected
    pub async fn create(&self, form: BlogForm, author_id: &str) -> Result<Blog, BlogServiceError> {
        let (Some(title), Some(content)) = (non_blank(form.title), non_blank(form.content)) else {
            return Err(BlogServiceError::ValidationError(
                "Title and content are required".to_string(),
            ));
        };
        let slug = slug_for(&title)?;
        let status = match non_blank(form.status) {
            Some(status) => parse_status(&status)?,
            None => BlogStatus::Draft,
        };
        let tag_ids = match form.tags {
            Some(raw) => parse_tag_ids(&raw)?,
            None => Vec::new(),
        };

        let featured_image = match &form.featured_image {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };

        let input = NewBlog {
            title,
            slug,
            content,
            excerpt: non_blank(form.excerpt),
            featured_image: featured_image.clone(),
            category_id: non_blank(form.category_id),
            status,
            author_id: author_id.to_string(),
            published_at: (status == BlogStatus::Published).then(Utc::now),
            tag_ids,
        };

        match self.blog_repo.create(&input).await {
            Ok(blog) => {
                tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Blog created");
                Ok(blog)
            }
            Err(e) => {
                if let Some(url) = &featured_image {
                    self.images.remove(url).await;
                }
                Err(map_write_error(e))
            }
        }
    }

    /// Apply the submitted fields to an existing blog.
    ///
    /// Blank title/content are ignored, a blank category clears it, a status
    /// change into `published` stamps `published_at`, and a submitted tag list
    /// replaces the current tags.
    pub async fn update(&self, id: &str, form: BlogForm) -> Result<(), BlogServiceError> {
        let existing = self
            .blog_repo
            .get_by_id(id)
            .await
            .context("Failed to get blog")?
            .ok_or(BlogServiceError::NotFound)?;

        let mut changes = BlogChanges::default();
        if let Some(title) = non_blank(form.title) {
            changes.slug = Some(slug_for(&title)?);
            changes.title = Some(title);
        }
        changes.content = non_blank(form.content);
        if let Some(excerpt) = form.excerpt {
            changes.excerpt = Some(non_blank(Some(excerpt)));
        }
        if let Some(category_id) = form.category_id {
            changes.category_id = Some(non_blank(Some(category_id)));
        }
        if let Some(status) = non_blank(form.status) {
            let status = parse_status(&status)?;
            if status == BlogStatus::Published && existing.status != BlogStatus::Published {
                changes.published_at = Some(Utc::now());
            }
            changes.status = Some(status);
        }
        if let Some(raw) = form.tags {
            changes.tag_ids = Some(parse_tag_ids(&raw)?);
        }

        let new_image = match &form.featured_image {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };
        if let Some(url) = &new_image {
            changes.featured_image = Some(Some(url.clone()));
        }

        let result = self.blog_repo.update(id, &changes).await;
        match result {
            Ok(true) => {
                if let (Some(_), Some(old)) = (&new_image, &existing.featured_image) {
                    self.images.remove(old).await;
                }
                tracing::info!(blog_id = %id, "Blog updated");
                Ok(())
            }
            Ok(false) => {
                if let Some(url) = &new_image {
                    self.images.remove(url).await;
                }
                Err(BlogServiceError::NotFound)
            }
            Err(e) => {
                if let Some(url) = &new_image {
                    self.images.remove(url).await;
                }
                Err(map_write_error(e))
            }
        }
    }

    /// Delete a blog, its tag links and comments, and its stored image
    pub async fn delete(&self, id: &str) -> Result<(), BlogServiceError> {
        let existing = self
            .blog_repo
            .get_by_id(id)
            .await
            .context("Failed to get blog")?
            .ok_or(BlogServiceError::NotFound)?;

        if !self.blog_repo.delete(id).await.context("Failed to delete blog")? {
            return Err(BlogServiceError::NotFound);
        }

        if let Some(url) = &existing.featured_image {
            self.images.remove(url).await;
        }
        tracing::info!(blog_id = %id, "Blog deleted");
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<BlogStatus, BlogServiceError> {
    raw.parse()
        .map_err(|_| BlogServiceError::ValidationError("Invalid status".to_string()))
}

fn slug_for(title: &str) -> Result<String, BlogServiceError> {
    let slug = generate_slug(title);
    if slug.is_empty() {
        return Err(BlogServiceError::ValidationError(
            "Title must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

/// Parse the `tags` form field. An empty field means "no tags".
fn parse_tag_ids(raw: &str) -> Result<Vec<String>, BlogServiceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = serde_json::from_str(raw).map_err(|_| {
        BlogServiceError::ValidationError("Tags must be a JSON array of tag ids".to_string())
    })?;
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

fn map_write_error(e: anyhow::Error) -> BlogServiceError {
    if is_unique_violation(&e) {
        BlogServiceError::DuplicateTitle
    } else if is_foreign_key_violation(&e) {
        BlogServiceError::ValidationError("Unknown category or tag".to_string())
    } else {
        BlogServiceError::InternalError(e)
    }
}
