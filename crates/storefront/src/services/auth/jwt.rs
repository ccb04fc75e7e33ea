//! Bearer tokens (JWT, HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use takviye_core::{Role, UserId};

use super::AuthError;
use crate::config::JwtConfig;
use crate::models::user::User;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, expired or
    /// tampered token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;
    use takviye_core::Email;

    use super::*;

    fn keys(secret: &str, ttl_hours: i64) -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: SecretString::from(secret.to_string()),
            ttl_hours,
        })
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::new(42),
            username: "ayse".to_string(),
            email: Email::parse("ayse@ornek.com.tr").unwrap(),
            password_hash: String::new(),
            full_name: None,
            phone: None,
            role,
            loyalty_points: 0,
            referral_code: "AYSE1234".to_string(),
            referred_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys("k7Qz!p9Lm#2vX8rT$w4Yb6Nc&u1Hd3Fe", 24);
        let token = keys.issue(&user(Role::Editor)).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.username, "ayse");
        assert_eq!(claims.role, Role::Editor);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = keys("k7Qz!p9Lm#2vX8rT$w4Yb6Nc&u1Hd3Fe", 24)
            .issue(&user(Role::Admin))
            .unwrap();
        let other = keys("Zr4@hB8!mQ2#vN6$tK1%yW9^cJ5&pL3*", 24);
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let keys = keys("k7Qz!p9Lm#2vX8rT$w4Yb6Nc&u1Hd3Fe", -2);
        let token = keys.issue(&user(Role::Customer)).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
