//! Dashboard statistics repository
//!
//! Read-only aggregate queries backing the admin overview.

use crate::db::DynDatabasePool;
use crate::models::{
    BlogCounts, BlogStatus, BlogSummary, CommentCounts, CommentStatus, ContactCounts,
    DashboardStats, RecentComment,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use super::{with_pool, DecodeRow};

/// Number of rows shown in each "recent" list
pub const RECENT_LIMIT: i64 = 5;

const BLOG_COUNTS: &str = r#"
    SELECT COUNT(*) AS total,
           COUNT(CASE WHEN status = 'published' THEN 1 END) AS published,
           COUNT(CASE WHEN status = 'draft' THEN 1 END) AS drafts
    FROM blogs
"#;

const COMMENT_COUNTS: &str = r#"
    SELECT COUNT(*) AS total,
           COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending,
           COUNT(CASE WHEN status = 'approved' THEN 1 END) AS approved
    FROM comments
"#;

const CONTACT_COUNTS: &str = r#"
    SELECT COUNT(*) AS total,
           COUNT(CASE WHEN status = 'new' THEN 1 END) AS new_messages
    FROM contacts
"#;

const RECENT_BLOGS: &str = r#"
    SELECT id, title, slug, status, created_at
    FROM blogs
    ORDER BY created_at DESC
    LIMIT ?
"#;

const RECENT_COMMENTS: &str = r#"
    SELECT cm.id, cm.author_name, cm.content, cm.status, cm.created_at, b.title AS blog_title
    FROM comments cm
    LEFT JOIN blogs b ON b.id = cm.blog_id
    ORDER BY cm.created_at DESC
    LIMIT ?
"#;

/// Dashboard repository trait
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Collect counts and recent activity
    async fn stats(&self) -> Result<DashboardStats>;
}

/// SQLx-based dashboard repository implementation
pub struct SqlxDashboardRepository {
    pool: DynDatabasePool,
}

impl SqlxDashboardRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DashboardRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DashboardRepository for SqlxDashboardRepository {
    async fn stats(&self) -> Result<DashboardStats> {
        with_pool!(self.pool, |pool| {
            let row = sqlx::query(BLOG_COUNTS)
                .fetch_one(pool)
                .await
                .context("Failed to count blogs")?;
            let blogs = BlogCounts {
                total: row.int("total")?,
                published: row.int("published")?,
                drafts: row.int("drafts")?,
            };

            let row = sqlx::query(COMMENT_COUNTS)
                .fetch_one(pool)
                .await
                .context("Failed to count comments")?;
            let comments = CommentCounts {
                total: row.int("total")?,
                pending: row.int("pending")?,
                approved: row.int("approved")?,
            };

            let row = sqlx::query(CONTACT_COUNTS)
                .fetch_one(pool)
                .await
                .context("Failed to count contacts")?;
            let contacts = ContactCounts {
                total: row.int("total")?,
                new_messages: row.int("new_messages")?,
            };

            let categories = sqlx::query("SELECT COUNT(*) AS total FROM categories")
                .fetch_one(pool)
                .await
                .context("Failed to count categories")?
                .int("total")?;
            let tags = sqlx::query("SELECT COUNT(*) AS total FROM tags")
                .fetch_one(pool)
                .await
                .context("Failed to count tags")?
                .int("total")?;

            let recent_blogs = sqlx::query(RECENT_BLOGS)
                .bind(RECENT_LIMIT)
                .fetch_all(pool)
                .await
                .context("Failed to load recent blogs")?
                .iter()
                .map(row_to_summary)
                .collect::<Result<Vec<_>>>()?;

            let recent_comments = sqlx::query(RECENT_COMMENTS)
                .bind(RECENT_LIMIT)
                .fetch_all(pool)
                .await
                .context("Failed to load recent comments")?
                .iter()
                .map(row_to_recent_comment)
                .collect::<Result<Vec<_>>>()?;

            Ok(DashboardStats {
                blogs,
                comments,
                contacts,
                categories,
                tags,
                recent_blogs,
                recent_comments,
            })
        })
    }
}

fn row_to_summary(row: &impl DecodeRow) -> Result<BlogSummary> {
    Ok(BlogSummary {
        id: row.text("id")?,
        title: row.text("title")?,
        slug: row.text("slug")?,
        status: BlogStatus::from_str(&row.text("status")?)?,
        created_at: row.timestamp("created_at")?,
    })
}

fn row_to_recent_comment(row: &impl DecodeRow) -> Result<RecentComment> {
    Ok(RecentComment {
        id: row.text("id")?,
        author_name: row.text("author_name")?,
        content: row.text("content")?,
        status: CommentStatus::from_str(&row.text("status")?)?,
        created_at: row.timestamp("created_at")?,
        blog_title: row.opt_text("blog_title")?,
    })
}
