//! Comment service
//!
//! Public submissions land in `pending` and only become visible once an
//! admin approves them. Comments can only be left on published blogs.

use crate::db::repositories::{BlogRepository, CommentRepository};
use crate::models::{Comment, CommentFilter, CommentStatus, NewComment};
use crate::utils::{is_valid_email, non_blank};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Validation error
    #[error("{0}")]
    ValidationError(String),

    /// Target blog missing or not published
    #[error("Blog not found")]
    BlogNotFound,

    /// Comment not found
    #[error("Comment not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Public comment submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub blog_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Moderation list filters as received in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentListQuery {
    pub status: Option<String>,
    pub blog_id: Option<String>,
}

/// Comment service
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    blog_repo: Arc<dyn BlogRepository>,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>, blog_repo: Arc<dyn BlogRepository>) -> Self {
        Self {
            comment_repo,
            blog_repo,
        }
    }

    /// Submit a comment for moderation.
    ///
    /// # Errors
    /// - `ValidationError` if a field is missing or the email is malformed
    /// - `BlogNotFound` if the blog does not exist or is still a draft
    pub async fn create(&self, input: CommentInput) -> Result<Comment, CommentServiceError> {
        let (Some(blog_id), Some(author_name), Some(author_email), Some(content)) = (
            non_blank(input.blog_id),
            non_blank(input.author_name),
            non_blank(input.author_email),
            non_blank(input.content),
        ) else {
            return Err(CommentServiceError::ValidationError(
                "All fields are required".to_string(),
            ));
        };
        if !is_valid_email(&author_email) {
            return Err(CommentServiceError::ValidationError(
                "Invalid email address".to_string(),
            ));
        }

        let blog = self
            .blog_repo
            .get_by_id(&blog_id)
            .await
            .context("Failed to look up blog")?;
        if !blog.is_some_and(|b| b.is_published()) {
            return Err(CommentServiceError::BlogNotFound);
        }

        let comment = self
            .comment_repo
            .create(&NewComment {
                blog_id,
                author_name,
                author_email,
                content,
            })
            .await?;

        tracing::info!(comment_id = %comment.id, blog_id = %comment.blog_id, "Comment submitted");
        Ok(comment)
    }

    /// Moderation queue, newest first
    pub async fn list(&self, query: &CommentListQuery) -> Result<Vec<Comment>, CommentServiceError> {
        let status = match non_blank(query.status.clone()) {
            Some(raw) => Some(parse_status(Some(&raw))?),
            None => None,
        };
        let filter = CommentFilter {
            status,
            blog_id: non_blank(query.blog_id.clone()),
        };
        Ok(self
            .comment_repo
            .list(&filter)
            .await
            .context("Failed to list comments")?)
    }

    /// Set the moderation status
    pub async fn update_status(&self, id: &str, status: Option<&str>) -> Result<(), CommentServiceError> {
        let status = parse_status(status)?;
        if self
            .comment_repo
            .update_status(id, status)
            .await
            .context("Failed to update comment status")?
        {
            tracing::info!(comment_id = %id, status = %status, "Comment moderated");
            Ok(())
        } else {
            Err(CommentServiceError::NotFound)
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), CommentServiceError> {
        if self.comment_repo.delete(id).await.context("Failed to delete comment")? {
            Ok(())
        } else {
            Err(CommentServiceError::NotFound)
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<CommentStatus, CommentServiceError> {
    raw.and_then(|s| s.parse().ok())
        .ok_or_else(|| CommentServiceError::ValidationError("Invalid status".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxBlogRepository, SqlxCommentRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{BlogStatus, NewBlog, UserRole};
    use chrono::Utc;

    struct Fixture {
        service: CommentService,
        published_id: String,
        draft_id: String,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let author = SqlxUserRepository::new(pool.clone())
            .create("a@example.com", "hash", "A", UserRole::Admin)
            .await
            .unwrap();
        let blogs = SqlxBlogRepository::boxed(pool.clone());
        let mut ids = Vec::new();
        for (slug, status) in [("live", BlogStatus::Published), ("wip", BlogStatus::Draft)] {
            let blog = blogs
                .create(&NewBlog {
                    title: slug.into(),
                    slug: slug.into(),
                    content: "body".into(),
                    excerpt: None,
                    featured_image: None,
                    category_id: None,
                    status,
                    author_id: author.id.clone(),
                    published_at: (status == BlogStatus::Published).then(Utc::now),
                    tag_ids: vec![],
                })
                .await
                .unwrap();
            ids.push(blog.id);
        }

        Fixture {
            service: CommentService::new(SqlxCommentRepository::boxed(pool), blogs),
            published_id: ids[0].clone(),
            draft_id: ids[1].clone(),
        }
    }

    fn input(blog_id: &str) -> CommentInput {
        CommentInput {
            blog_id: Some(blog_id.to_string()),
            author_name: Some("Reader".into()),
            author_email: Some("reader@example.com".into()),
            content: Some("Great post".into()),
        }
    }

    #[tokio::test]
    async fn test_create_on_published_blog_is_pending() {
        let fx = setup().await;
        let comment = fx.service.create(input(&fx.published_id)).await.unwrap();
        assert_eq!(comment.status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_on_draft_or_missing_blog() {
        let fx = setup().await;
        assert!(matches!(
            fx.service.create(input(&fx.draft_id)).await,
            Err(CommentServiceError::BlogNotFound)
        ));
        assert!(matches!(
            fx.service.create(input("missing")).await,
            Err(CommentServiceError::BlogNotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let fx = setup().await;
        let mut missing = input(&fx.published_id);
        missing.content = Some("   ".into());
        assert!(matches!(
            fx.service.create(missing).await,
            Err(CommentServiceError::ValidationError(ref m)) if m == "All fields are required"
        ));

        let mut bad_email = input(&fx.published_id);
        bad_email.author_email = Some("not-an-email".into());
        assert!(matches!(
            fx.service.create(bad_email).await,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_moderation() {
        let fx = setup().await;
        let comment = fx.service.create(input(&fx.published_id)).await.unwrap();

        assert!(matches!(
            fx.service.update_status(&comment.id, Some("spam")).await,
            Err(CommentServiceError::ValidationError(ref m)) if m == "Invalid status"
        ));
        assert!(matches!(
            fx.service.update_status(&comment.id, None).await,
            Err(CommentServiceError::ValidationError(_))
        ));
        assert!(matches!(
            fx.service.update_status("missing", Some("approved")).await,
            Err(CommentServiceError::NotFound)
        ));

        fx.service.update_status(&comment.id, Some("approved")).await.unwrap();
        let approved = fx
            .service
            .list(&CommentListQuery {
                status: Some("approved".into()),
                blog_id: None,
            })
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);

        fx.service.delete(&comment.id).await.unwrap();
        assert!(matches!(
            fx.service.delete(&comment.id).await,
            Err(CommentServiceError::NotFound)
        ));
    }
}
