//! Contact message service

use crate::db::repositories::ContactRepository;
use crate::models::{Contact, ContactStatus, NewContact};
use crate::utils::{is_valid_email, non_blank};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for contact service operations
#[derive(Debug, thiserror::Error)]
pub enum ContactServiceError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Contact not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Public contact form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Contact service
pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }

    /// Store a message from the public form
    pub async fn create(&self, input: ContactInput) -> Result<Contact, ContactServiceError> {
        let (Some(name), Some(email), Some(message)) = (
            non_blank(input.name),
            non_blank(input.email),
            non_blank(input.message),
        ) else {
            return Err(ContactServiceError::ValidationError(
                "Name, email, and message are required".to_string(),
            ));
        };
        if !is_valid_email(&email) {
            return Err(ContactServiceError::ValidationError(
                "Invalid email address".to_string(),
            ));
        }

        let contact = self
            .repo
            .create(&NewContact {
                name,
                email,
                subject: non_blank(input.subject),
                message,
            })
            .await?;

        tracing::info!(contact_id = %contact.id, "Contact message received");
        Ok(contact)
    }

    /// Messages newest first, optionally filtered by status
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Contact>, ContactServiceError> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_status(Some(raw))?),
            None => None,
        };
        Ok(self.repo.list(status).await.context("Failed to list contacts")?)
    }

    pub async fn update_status(&self, id: &str, status: Option<&str>) -> Result<(), ContactServiceError> {
        let status = parse_status(status)?;
        if self
            .repo
            .update_status(id, status)
            .await
            .context("Failed to update contact status")?
        {
            Ok(())
        } else {
            Err(ContactServiceError::NotFound)
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContactServiceError> {
        if self.repo.delete(id).await.context("Failed to delete contact")? {
            Ok(())
        } else {
            Err(ContactServiceError::NotFound)
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<ContactStatus, ContactServiceError> {
    raw.and_then(|s| s.parse().ok())
        .ok_or_else(|| ContactServiceError::ValidationError("Invalid status".to_string()))
}
