//! Category service
//!
//! Names are unique and each category's slug is derived from its name.
//! Deleting a category detaches its blogs rather than deleting them.

use crate::db::is_unique_violation;
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryChanges};
use crate::utils::{generate_slug, non_blank};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Validation error
    #[error("{0}")]
    ValidationError(String),

    /// Name or derived slug already taken
    #[error("Category with this name already exists")]
    DuplicateName,

    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for creating or updating a category.
///
/// For updates an absent field is left untouched and an empty description
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Category service for managing blog categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// All categories, alphabetical
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `ValidationError` if the name is missing
    /// - `DuplicateName` if the name or its slug already exists
    pub async fn create(&self, input: CategoryInput) -> Result<Category, CategoryServiceError> {
        let name = non_blank(input.name).ok_or_else(|| {
            CategoryServiceError::ValidationError("Category name is required".to_string())
        })?;
        let slug = slug_for(&name)?;
        let description = non_blank(input.description);

        self.repo
            .create(&name, &slug, description.as_deref())
            .await
            .map_err(map_write_error)
    }

    /// Update name and/or description
    pub async fn update(&self, id: &str, input: CategoryInput) -> Result<(), CategoryServiceError> {
        let mut changes = CategoryChanges::default();
        if let Some(name) = non_blank(input.name) {
            changes.slug = Some(slug_for(&name)?);
            changes.name = Some(name);
        }
        if let Some(description) = input.description {
            changes.description = Some(non_blank(Some(description)));
        }

        if !changes.has_changes() {
            return Err(CategoryServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        match self.repo.update(id, &changes).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CategoryServiceError::NotFound),
            Err(e) => Err(map_write_error(e)),
        }
    }

    /// Delete a category
    pub async fn delete(&self, id: &str) -> Result<(), CategoryServiceError> {
        if self.repo.delete(id).await.context("Failed to delete category")? {
            Ok(())
        } else {
            Err(CategoryServiceError::NotFound)
        }
    }
}

fn slug_for(name: &str) -> Result<String, CategoryServiceError> {
    let slug = generate_slug(name);
    if slug.is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Category name must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

fn map_write_error(e: anyhow::Error) -> CategoryServiceError {
    if is_unique_violation(&e) {
        CategoryServiceError::DuplicateName
    } else {
        CategoryServiceError::InternalError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    fn input(name: Option<&str>, description: Option<&str>) -> CategoryInput {
        CategoryInput {
            name: name.map(String::from),
            description: description.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let service = setup_test_service().await;
        let category = service
            .create(input(Some("Web Development"), Some("Frontend and backend")))
            .await
            .unwrap();
        assert_eq!(category.slug, "web-development");
        assert_eq!(category.description.as_deref(), Some("Frontend and backend"));
    }

    #[tokio::test]
    async fn test_create_validation_and_duplicates() {
        let service = setup_test_service().await;
        let missing = service.create(input(None, Some("x"))).await;
        assert!(
            matches!(missing, Err(CategoryServiceError::ValidationError(ref m)) if m == "Category name is required")
        );

        service.create(input(Some("Rust"), None)).await.unwrap();
        let dup = service.create(input(Some("Rust"), None)).await;
        assert!(matches!(dup, Err(CategoryServiceError::DuplicateName)));

        // Different name, same slug
        let dup_slug = service.create(input(Some("rust!"), None)).await;
        assert!(matches!(dup_slug, Err(CategoryServiceError::DuplicateName)));
    }

    #[tokio::test]
    async fn test_update_rules() {
        let service = setup_test_service().await;
        let category = service.create(input(Some("Old"), Some("desc"))).await.unwrap();

        let empty = service.update(&category.id, input(None, None)).await;
        assert!(
            matches!(empty, Err(CategoryServiceError::ValidationError(ref m)) if m == "No fields to update")
        );

        service
            .update(&category.id, input(Some("Brand New"), None))
            .await
            .unwrap();
        let listed = service.list().await.unwrap();
        assert_eq!(listed[0].slug, "brand-new");
        assert_eq!(listed[0].description.as_deref(), Some("desc"));

        service.update(&category.id, input(None, Some(""))).await.unwrap();
        assert!(service.list().await.unwrap()[0].description.is_none());

        let missing = service.update("missing", input(Some("X"), None)).await;
        assert!(matches!(missing, Err(CategoryServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup_test_service().await;
        let category = service.create(input(Some("Gone"), None)).await.unwrap();
        service.delete(&category.id).await.unwrap();
        assert!(matches!(
            service.delete(&category.id).await,
            Err(CategoryServiceError::NotFound)
        ));
    }
}
