//! Contact message repository

use crate::db::DynDatabasePool;
use crate::models::{Contact, ContactStatus, NewContact};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

const CONTACT_COLUMNS: &str =
    "SELECT id, name, email, subject, message, status, created_at FROM contacts";

/// Contact repository trait
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Store a new message in `new` status
    async fn create(&self, contact: &NewContact) -> Result<Contact>;

    /// List messages newest first, optionally by status
    async fn list(&self, status: Option<ContactStatus>) -> Result<Vec<Contact>>;

    /// Update message status
    async fn update_status(&self, id: &str, status: ContactStatus) -> Result<bool>;

    /// Delete a message
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based contact repository implementation
pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, contact: &NewContact) -> Result<Contact> {
        let id = new_id();
        let now = Utc::now();
        let status = ContactStatus::New;

        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                INSERT INTO contacts (id, name, email, subject, message, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.subject)
            .bind(&contact.message)
            .bind(status.as_str())
            .bind(now)
            .execute(pool)
            .await
            .context("Failed to create contact")?;
        });

        Ok(Contact {
            id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            subject: contact.subject.clone(),
            message: contact.message.clone(),
            status,
            created_at: now,
        })
    }

    async fn list(&self, status: Option<ContactStatus>) -> Result<Vec<Contact>> {
        let sql = match status {
            Some(_) => format!("{} WHERE status = ? ORDER BY created_at DESC", CONTACT_COLUMNS),
            None => format!("{} ORDER BY created_at DESC", CONTACT_COLUMNS),
        };

        with_pool!(self.pool, |pool| {
            let mut query = sqlx::query(&sql);
            if let Some(status) = status {
                query = query.bind(status.as_str());
            }
            query
                .fetch_all(pool)
                .await
                .context("Failed to list contacts")?
                .iter()
                .map(row_to_contact)
                .collect()
        })
    }

    async fn update_status(&self, id: &str, status: ContactStatus) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            sqlx::query("UPDATE contacts SET status = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to update contact status")?
                .rows_affected()
        });

        Ok(affected > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            sqlx::query("DELETE FROM contacts WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete contact")?
                .rows_affected()
        });

        Ok(affected > 0)
    }
}

fn row_to_contact(row: &impl DecodeRow) -> Result<Contact> {
    Ok(Contact {
        id: row.text("id")?,
        name: row.text("name")?,
        email: row.text("email")?,
        subject: row.opt_text("subject")?,
        message: row.text("message")?,
        status: ContactStatus::from_str(&row.text("status")?)?,
        created_at: row.timestamp("created_at")?,
    })
}
