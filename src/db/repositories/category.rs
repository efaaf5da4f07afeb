//! Category repository
//!
//! Database operations for categories.

use crate::db::update::{ApplyUpdate, UpdateBuilder};
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryChanges};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// List all categories, alphabetical by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// Apply a partial update. Returns false when the category does not exist.
    async fn update(&self, id: &str, changes: &CategoryChanges) -> Result<bool>;

    /// Delete a category. Returns false when the category does not exist.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> Result<Category> {
        let id = new_id();
        let now = Utc::now();

        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, slug, description, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
            .context("Failed to create category")?;
        });

        Ok(Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Category>> {
        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                SELECT id, name, slug, description, created_at, updated_at
                FROM categories
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("Failed to get category by ID")?
            .map(|row| row_to_category(&row))
            .transpose()
        })
    }

    async fn list(&self) -> Result<Vec<Category>> {
        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                SELECT id, name, slug, description, created_at, updated_at
                FROM categories
                ORDER BY name ASC
                "#,
            )
            .fetch_all(pool)
            .await
            .context("Failed to list categories")?
            .iter()
            .map(row_to_category)
            .collect()
        })
    }

    async fn update(&self, id: &str, changes: &CategoryChanges) -> Result<bool> {
        let mut builder = UpdateBuilder::new("categories");
        if let Some(name) = &changes.name {
            builder.set_text("name", Some(name.clone()));
        }
        if let Some(slug) = &changes.slug {
            builder.set_text("slug", Some(slug.clone()));
        }
        if let Some(description) = &changes.description {
            builder.set_text("description", description.clone());
        }
        builder.set_timestamp("updated_at", Some(Utc::now()));

        let affected = with_pool!(self.pool, |pool| {
            let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
            conn.apply_update(&builder, id).await?
        });

        Ok(affected > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            sqlx::query("DELETE FROM categories WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete category")?
                .rows_affected()
        });

        Ok(affected > 0)
    }
}

fn row_to_category(row: &impl DecodeRow) -> Result<Category> {
    Ok(Category {
        id: row.text("id")?,
        name: row.text("name")?,
        slug: row.text("slug")?,
        description: row.opt_text("description")?,
        created_at: row.timestamp("created_at")?,
        updated_at: row.timestamp("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, is_unique_violation, migrations::run_migrations};

    async fn setup() -> Arc<dyn CategoryRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxCategoryRepository::boxed(pool)
    }

    #[tokio::test]
    async fn test_list_is_alphabetical() {
        let repo = setup().await;
        repo.create("Travel", "travel", None).await.unwrap();
        repo.create("Art", "art", Some("Paintings")).await.unwrap();
        repo.create("Music", "music", None).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Art", "Music", "Travel"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = setup().await;
        repo.create("Rust", "rust", None).await.unwrap();
        let err = repo.create("Rust", "rust-2", None).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = setup().await;
        let created = repo.create("Rust", "rust", Some("Systems")).await.unwrap();

        let changes = CategoryChanges {
            description: Some(None),
            ..Default::default()
        };
        assert!(repo.update(&created.id, &changes).await.unwrap());

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Rust");
        assert_eq!(fetched.description, None);

        assert!(!repo.update("missing", &changes).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup().await;
        let created = repo.create("Rust", "rust", None).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(!repo.delete(&created.id).await.unwrap());
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    }
}
