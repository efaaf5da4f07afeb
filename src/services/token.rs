//! Bearer token issuance and verification
//!
//! Tokens are HS256 JWTs. No server-side state is kept, so logout is purely
//! a client concern and a token stays valid until `exp`.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::models::User;

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies tokens with a shared secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Build from configuration, generating a throwaway secret when none is set.
    ///
    /// A generated secret invalidates every token on restart.
    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) => Self::new(secret, config.token_ttl_hours),
            None => {
                tracing::warn!(
                    "auth.jwt_secret is not set; using a random secret for this process"
                );
                let secret = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
                Self::new(&secret, config.token_ttl_hours)
            }
        }
    }

    /// Issue a token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign token")
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .context("Token verification failed")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: "u-1".into(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            name: "Admin".into(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new("secret", 24);
        let token = tokens.issue(&user()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret", 1).issue(&user()).unwrap();
        assert!(TokenService::new("other", 1).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("secret", -1);
        let token = tokens.issue(&user()).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = TokenService::new("secret", 1);
        assert!(tokens.verify("not.a.token").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn test_generated_secret_still_round_trips() {
        let tokens = TokenService::from_config(&AuthConfig::default());
        let token = tokens.issue(&user()).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }
}
