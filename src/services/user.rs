//! User service
//!
//! Login, bearer-token resolution and account provisioning:
//! - Login verifies the argon2 hash and issues a JWT
//! - Token resolution re-reads the user so deleted accounts lose access
//! - Provisioning is used by the `create-admin` binary only

use crate::db::repositories::UserRepository;
use crate::models::{User, UserProfile, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    ValidationError(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad signature, expired token, or user no longer present
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Email already registered
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserProfile,
}

/// Input for provisioning a user
#[derive(Debug, Clone)]
pub struct NewUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// User service for authentication and provisioning
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if email or password is missing
    /// - `InvalidCredentials` for an unknown email or a wrong password
    pub async fn login(&self, input: LoginInput) -> Result<LoginResult, UserServiceError> {
        let email = input
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default();
        let password = input.password.as_deref().unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(UserServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            token,
            user: user.profile(),
        })
    }

    /// Resolve a bearer token to its (still existing) user
    pub async fn authenticate(&self, token: &str) -> Result<User, UserServiceError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {:#}", e);
            UserServiceError::InvalidToken
        })?;

        self.user_repo
            .get_by_id(&claims.sub)
            .await
            .context("Failed to load token user")?
            .ok_or(UserServiceError::InvalidToken)
    }

    /// Create a user with a hashed password.
    ///
    /// Returns `UserExists` without touching the stored account when the
    /// email is already registered.
    pub async fn create_user(&self, input: NewUserInput) -> Result<User, UserServiceError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || input.password.is_empty() || input.name.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email, password and name are required".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check existing user")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .user_repo
            .create(&email, &password_hash, input.name.trim(), input.role)
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }
}
