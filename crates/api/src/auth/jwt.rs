//! Learner session tokens.
//!
//! A session is a single HS256 JWT carrying the learner id and role. It is
//! never stored server side and there is no refresh flow: once it expires the
//! learner logs in again.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use promptcademy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime when `JWT_EXPIRY_MINS` is unset: one week.
const DEFAULT_EXPIRY_MINS: i64 = 7 * 24 * 60;

/// Payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Learner id.
    pub sub: DbId,
    /// `learner` or `admin`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id.
    pub jti: String,
}

/// Signing secret and session lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and `JWT_EXPIRY_MINS`
    /// (default `10080`).
    ///
    /// # Panics
    ///
    /// At startup, when the secret is missing or the lifetime is not a number.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set to a non-empty value");

        let expiry_mins = match std::env::var("JWT_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_EXPIRY_MINS must be a whole number of minutes"),
            Err(_) => DEFAULT_EXPIRY_MINS,
        };

        Self {
            secret,
            expiry_mins,
        }
    }
}

/// Sign a session token for `user_id` that is valid from now on.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, JwtError> {
    issue_at(user_id, role, config, Utc::now())
}

/// Sign a session token as if issued at `issued_at`.
fn issue_at(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
    issued_at: Timestamp,
) -> Result<String, JwtError> {
    let claims = Claims {
        sub: user_id,
        role: role.to_owned(),
        iat: issued_at.timestamp(),
        exp: (issued_at + Duration::minutes(config.expiry_mins)).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let key = EncodingKey::from_secret(config.secret.as_bytes());
    jsonwebtoken::encode(&Header::default(), &claims, &key)
}

/// Check signature and expiry and return the claims.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    jsonwebtoken::decode::<Claims>(token, &key, &Validation::default()).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_mins: 30,
        }
    }

    #[test]
    fn session_carries_learner_and_role() {
        let cfg = config("test-secret-that-is-long-enough-for-hmac");
        let token = generate_access_token(7, "admin", &cfg).unwrap();

        let claims = validate_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn session_issued_yesterday_has_expired() {
        let cfg = config("test-secret-that-is-long-enough-for-hmac");
        let token = issue_at(7, "learner", &cfg, Utc::now() - Duration::days(1)).unwrap();

        assert!(validate_token(&token, &cfg).is_err());
    }

    #[test]
    fn session_from_another_deployment_is_rejected() {
        let token = generate_access_token(7, "learner", &config("secret-alpha")).unwrap();
        assert!(validate_token(&token, &config("secret-bravo")).is_err());
    }

    #[test]
    fn each_session_gets_its_own_id() {
        let cfg = config("test-secret-that-is-long-enough-for-hmac");
        let a = validate_token(&generate_access_token(1, "learner", &cfg).unwrap(), &cfg).unwrap();
        let b = validate_token(&generate_access_token(1, "learner", &cfg).unwrap(), &cfg).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
