//! Comment repository

use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentFilter, CommentStatus, NewComment, PublicComment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment in `pending` status
    async fn create(&self, comment: &NewComment) -> Result<Comment>;

    /// List comments for moderation, newest first
    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>>;

    /// Approved comments of one blog, newest first
    async fn list_approved_for_blog(&self, blog_id: &str) -> Result<Vec<PublicComment>>;

    /// Update comment status
    async fn update_status(&self, id: &str, status: CommentStatus) -> Result<bool>;

    /// Delete a comment
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &NewComment) -> Result<Comment> {
        let id = new_id();
        let now = Utc::now();
        let status = CommentStatus::Pending;

        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                INSERT INTO comments (id, blog_id, author_name, author_email, content, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&comment.blog_id)
            .bind(&comment.author_name)
            .bind(&comment.author_email)
            .bind(&comment.content)
            .bind(status.as_str())
            .bind(now)
            .execute(pool)
            .await
            .context("Failed to create comment")?;
        });

        Ok(Comment {
            id,
            blog_id: comment.blog_id.clone(),
            author_name: comment.author_name.clone(),
            author_email: comment.author_email.clone(),
            content: comment.content.clone(),
            status,
            created_at: now,
            blog_title: None,
            blog_slug: None,
        })
    }

    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>> {
        let mut sql = String::from(
            r#"
            SELECT cm.id, cm.blog_id, cm.author_name, cm.author_email, cm.content, cm.status,
                   cm.created_at, b.title AS blog_title, b.slug AS blog_slug
            FROM comments cm
            LEFT JOIN blogs b ON b.id = cm.blog_id
            WHERE 1 = 1
            "#,
        );
        let mut binds = Vec::new();
        if let Some(status) = filter.status {
            sql.push_str(" AND cm.status = ?");
            binds.push(status.as_str().to_string());
        }
        if let Some(blog_id) = &filter.blog_id {
            sql.push_str(" AND cm.blog_id = ?");
            binds.push(blog_id.clone());
        }
        sql.push_str(" ORDER BY cm.created_at DESC");

        with_pool!(self.pool, |pool| {
            let mut query = sqlx::query(&sql);
            for value in &binds {
                query = query.bind(value);
            }
            query
                .fetch_all(pool)
                .await
                .context("Failed to list comments")?
                .iter()
                .map(row_to_comment)
                .collect()
        })
    }

    async fn list_approved_for_blog(&self, blog_id: &str) -> Result<Vec<PublicComment>> {
        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                SELECT id, author_name, content, created_at
                FROM comments
                WHERE blog_id = ? AND status = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(blog_id)
            .bind(CommentStatus::Approved.as_str())
            .fetch_all(pool)
            .await
            .context("Failed to list approved comments")?
            .iter()
            .map(row_to_public_comment)
            .collect()
        })
    }

    async fn update_status(&self, id: &str, status: CommentStatus) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to update comment status")?
                .rows_affected()
        });

        Ok(affected > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete comment")?
                .rows_affected()
        });

        Ok(affected > 0)
    }
}

fn row_to_comment(row: &impl DecodeRow) -> Result<Comment> {
    Ok(Comment {
        id: row.text("id")?,
        blog_id: row.text("blog_id")?,
        author_name: row.text("author_name")?,
        author_email: row.text("author_email")?,
        content: row.text("content")?,
        status: CommentStatus::from_str(&row.text("status")?)?,
        created_at: row.timestamp("created_at")?,
        blog_title: row.opt_text("blog_title")?,
        blog_slug: row.opt_text("blog_slug")?,
    })
}

fn row_to_public_comment(row: &impl DecodeRow) -> Result<PublicComment> {
    Ok(PublicComment {
        id: row.text("id")?,
        author_name: row.text("author_name")?,
        content: row.text("content")?,
        created_at: row.timestamp("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::{BlogRepository, SqlxBlogRepository, SqlxUserRepository, UserRepository};
    use crate::models::{BlogStatus, NewBlog, UserRole};

    async fn setup() -> (DynDatabasePool, Arc<dyn CommentRepository>, String) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let author = SqlxUserRepository::new(pool.clone())
            .create("a@example.com", "hash", "A", UserRole::Admin)
            .await
            .unwrap();
        let blog = SqlxBlogRepository::new(pool.clone())
            .create(&NewBlog {
                title: "Post".into(),
                slug: "post".into(),
                content: "body".into(),
                excerpt: None,
                featured_image: None,
                category_id: None,
                status: BlogStatus::Published,
                author_id: author.id,
                published_at: Some(Utc::now()),
                tag_ids: vec![],
            })
            .await
            .unwrap();

        (pool.clone(), SqlxCommentRepository::boxed(pool), blog.id)
    }

    fn comment(blog_id: &str, name: &str) -> NewComment {
        NewComment {
            blog_id: blog_id.to_string(),
            author_name: name.to_string(),
            author_email: format!("{}@example.com", name.to_lowercase()),
            content: format!("Comment from {}", name),
        }
    }

    #[tokio::test]
    async fn test_new_comments_are_pending() {
        let (_pool, repo, blog_id) = setup().await;
        let created = repo.create(&comment(&blog_id, "Ann")).await.unwrap();
        assert_eq!(created.status, CommentStatus::Pending);

        let listed = repo.list(&CommentFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].blog_title.as_deref(), Some("Post"));
        assert_eq!(listed[0].blog_slug.as_deref(), Some("post"));
    }

    #[tokio::test]
    async fn test_only_approved_are_public() {
        let (_pool, repo, blog_id) = setup().await;
        let ann = repo.create(&comment(&blog_id, "Ann")).await.unwrap();
        let bob = repo.create(&comment(&blog_id, "Bob")).await.unwrap();
        repo.create(&comment(&blog_id, "Cy")).await.unwrap();

        assert!(repo.update_status(&ann.id, CommentStatus::Approved).await.unwrap());
        assert!(repo.update_status(&bob.id, CommentStatus::Rejected).await.unwrap());

        let public = repo.list_approved_for_blog(&blog_id).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].author_name, "Ann");

        let pending = repo
            .list(&CommentFilter {
                status: Some(CommentStatus::Pending),
                blog_id: Some(blog_id.clone()),
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].author_name, "Cy");
    }

    #[tokio::test]
    async fn test_missing_comment_operations() {
        let (_pool, repo, _blog_id) = setup().await;
        assert!(!repo.update_status("nope", CommentStatus::Approved).await.unwrap());
        assert!(!repo.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_comments_cascade_with_blog() {
        let (pool, repo, blog_id) = setup().await;
        repo.create(&comment(&blog_id, "Ann")).await.unwrap();

        SqlxBlogRepository::new(pool).delete(&blog_id).await.unwrap();
        assert!(repo.list(&CommentFilter::default()).await.unwrap().is_empty());
    }
}
