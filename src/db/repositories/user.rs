//! User repository
//!
//! Database operations for users and their role.

use crate::db::DynDatabasePool;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

const USER_COLUMNS: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.name, r.name AS role, u.created_at, u.updated_at
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user holding the named role
    async fn create(&self, email: &str, password_hash: &str, name: &str, role: UserRole) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up the primary key of a role by name
    async fn find_role_id(&self, role: UserRole) -> Result<Option<String>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, email: &str, password_hash: &str, name: &str, role: UserRole) -> Result<User> {
        let role_id = self
            .find_role_id(role)
            .await?
            .with_context(|| format!("Role '{}' does not exist", role))?;

        let id = new_id();
        let now = Utc::now();

        with_pool!(self.pool, |pool| {
            sqlx::query(
                r#"
                INSERT INTO users (id, email, password_hash, name, role_id, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(&role_id)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
            .context("Failed to create user")?;
        });

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.id = ?", USER_COLUMNS);
        with_pool!(self.pool, |pool| {
            sqlx::query(&sql)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("Failed to get user by ID")?
                .map(|row| row_to_user(&row))
                .transpose()
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.email = ?", USER_COLUMNS);
        with_pool!(self.pool, |pool| {
            sqlx::query(&sql)
                .bind(email)
                .fetch_optional(pool)
                .await
                .context("Failed to get user by email")?
                .map(|row| row_to_user(&row))
                .transpose()
        })
    }

    async fn find_role_id(&self, role: UserRole) -> Result<Option<String>> {
        with_pool!(self.pool, |pool| {
            sqlx::query_scalar::<_, String>("SELECT id FROM roles WHERE name = ?")
                .bind(role.as_str())
                .fetch_optional(pool)
                .await
                .context("Failed to look up role")
        })
    }
}

fn row_to_user(row: &impl DecodeRow) -> Result<User> {
    let role_str = row.text("role")?;
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.text("id")?,
        email: row.text("email")?,
        password_hash: row.text("password_hash")?,
        name: row.text("name")?,
        role,
        created_at: row.timestamp("created_at")?,
        updated_at: row.timestamp("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, is_unique_violation, migrations::run_migrations};

    async fn setup() -> Arc<dyn UserRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxUserRepository::boxed(pool)
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let repo = setup().await;

        let created = repo
            .create("admin@example.com", "hash", "Admin User", UserRole::Admin)
            .await
            .unwrap();

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "admin@example.com");
        assert_eq!(by_id.role, UserRole::Admin);
        assert_eq!(by_id.password_hash, "hash");

        let by_email = repo.get_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let repo = setup().await;
        assert!(repo.get_by_id("nope").await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = setup().await;
        repo.create("dup@example.com", "h", "One", UserRole::Editor)
            .await
            .unwrap();

        let err = repo
            .create("dup@example.com", "h", "Two", UserRole::Editor)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_roles_resolve() {
        let repo = setup().await;
        assert!(repo.find_role_id(UserRole::Admin).await.unwrap().is_some());
        assert!(repo.find_role_id(UserRole::Editor).await.unwrap().is_some());
    }
}
