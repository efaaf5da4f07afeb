//! Tag repository
//!
//! Database operations for tags.

use crate::db::DynDatabasePool;
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, name: &str, slug: &str) -> Result<Tag>;

    /// List all tags, alphabetical by name
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Delete a tag and its blog associations. Returns false when missing.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, name: &str, slug: &str) -> Result<Tag> {
        let id = new_id();
        let now = Utc::now();

        with_pool!(self.pool, |pool| {
            sqlx::query("INSERT INTO tags (id, name, slug, created_at) VALUES (?, ?, ?, ?)")
                .bind(&id)
                .bind(name)
                .bind(slug)
                .bind(now)
                .execute(pool)
                .await
                .context("Failed to create tag")?;
        });

        Ok(Tag {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
        })
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        with_pool!(self.pool, |pool| {
            sqlx::query("SELECT id, name, slug, created_at FROM tags ORDER BY name ASC")
                .fetch_all(pool)
                .await
                .context("Failed to list tags")?
                .iter()
                .map(row_to_tag)
                .collect()
        })
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            let mut tx = pool.begin().await?;
            sqlx::query("DELETE FROM blog_tags WHERE tag_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to detach tag from blogs")?;
            let affected = sqlx::query("DELETE FROM tags WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete tag")?
                .rows_affected();
            tx.commit().await?;
            affected
        });

        Ok(affected > 0)
    }
}

fn row_to_tag(row: &impl DecodeRow) -> Result<Tag> {
    Ok(Tag {
        id: row.text("id")?,
        name: row.text("name")?,
        slug: row.text("slug")?,
        created_at: row.timestamp("created_at")?,
    })
}
