//! Tag service

use crate::db::is_unique_violation;
use crate::db::repositories::TagRepository;
use crate::models::Tag;
use crate::utils::{generate_slug, non_blank};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Tag with this name already exists")]
    DuplicateName,

    #[error("Tag not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for creating a tag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.repo.list().await.context("Failed to list tags")?)
    }

    /// Create a tag; the slug is derived from the name
    pub async fn create(&self, input: TagInput) -> Result<Tag, TagServiceError> {
        let name = non_blank(input.name)
            .ok_or_else(|| TagServiceError::ValidationError("Tag name is required".to_string()))?;
        let slug = generate_slug(&name);
        if slug.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Tag name must contain at least one letter or digit".to_string(),
            ));
        }

        self.repo.create(&name, &slug).await.map_err(|e| {
            if is_unique_violation(&e) {
                TagServiceError::DuplicateName
            } else {
                TagServiceError::InternalError(e)
            }
        })
    }

    /// Delete a tag; blogs lose the association
    pub async fn delete(&self, id: &str) -> Result<(), TagServiceError> {
        if self.repo.delete(id).await.context("Failed to delete tag")? {
            Ok(())
        } else {
            Err(TagServiceError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxTagRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> TagService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        TagService::new(SqlxTagRepository::boxed(pool))
    }

    fn named(name: &str) -> TagInput {
        TagInput {
            name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let service = setup_test_service().await;
        let tag = service.create(named("Machine Learning")).await.unwrap();
        assert_eq!(tag.slug, "machine-learning");

        service.create(named("AI")).await.unwrap();
        let names: Vec<String> = service.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["AI", "Machine Learning"]);

        service.delete(&tag.id).await.unwrap();
        assert!(matches!(service.delete(&tag.id).await, Err(TagServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_errors() {
        let service = setup_test_service().await;
        assert!(matches!(
            service.create(TagInput::default()).await,
            Err(TagServiceError::ValidationError(_))
        ));

        service.create(named("rust")).await.unwrap();
        assert!(matches!(
            service.create(named("rust")).await,
            Err(TagServiceError::DuplicateName)
        ));
    }
}
