use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    domain::{Role, User},
    error::{AppError, Result},
};

pub mod gate;

pub use gate::AccessPolicy;

/// Payload of the bearer token handed out at login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token.".to_string()))
    }
}

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_duration: Duration::hours(config.token_duration_hours),
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.token_duration).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Rejects tampered, malformed and expired tokens alike.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                AppError::Unauthenticated("Invalid or expired token.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(hours: i64) -> AuthService {
        AuthService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_duration_hours: hours,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Alumni,
            is_approved: false,
            is_active: true,
            profile_photo: String::new(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hash = AuthService::hash_password("secret1").await.unwrap();
        assert!(AuthService::verify_password("secret1", &hash).await.unwrap());
        assert!(!AuthService::verify_password("secret2", &hash).await.unwrap());
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = service(1);
        let user = user();
        let token = auth.issue_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, Role::Alumni);
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = service(-1).issue_token(&user()).unwrap();
        assert!(matches!(service(1).verify_token(&expired), Err(AppError::Unauthenticated(_))));

        let other = AuthService::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            token_duration_hours: 1,
        });
        let token = other.issue_token(&user()).unwrap();
        assert!(service(1).verify_token(&token).is_err());
        assert!(service(1).verify_token("not.a.token").is_err());
    }
}
