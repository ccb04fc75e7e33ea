//! Authentication service.
//!
//! Username/email + password accounts hashed with Argon2id, bearer tokens
//! signed as HS256 JWTs, and referral rewards at sign-up.

mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use sqlx::PgPool;

use takviye_core::loyalty::{
    LedgerReason, REFEREE_REWARD_POINTS, REFERRER_REWARD_POINTS, normalize_referral_code,
};
use takviye_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::loyalty::LoyaltyRepository;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;

const REFERRAL_CODE_LENGTH: usize = 8;

/// Characters used in generated referral codes (no 0/O or 1/I look-alikes).
const REFERRAL_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub full_name: Option<&'r str>,
    pub phone: Option<&'r str>,
    pub referral_code: Option<&'r str>,
}

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
        }
    }

    /// Register a customer account.
    ///
    /// With a valid referral code both the new user and the referrer are
    /// credited in the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input, `AuthError::InvalidReferralCode`
    /// for an unknown code and `AuthError::UserAlreadyExists` if the username
    /// or email is taken.
    pub async fn register(&self, form: &Registration<'_>) -> Result<User, AuthError> {
        let username = validate_username(form.username)?;
        let email = Email::parse(form.email)?;
        validate_password(form.password)?;

        let referrer = match form.referral_code.map(normalize_referral_code) {
            Some(code) if !code.is_empty() => Some(
                self.users
                    .get_by_referral_code(&code)
                    .await?
                    .ok_or(AuthError::InvalidReferralCode)?,
            ),
            _ => None,
        };

        let new_user = NewUser {
            username,
            email,
            password_hash: hash_password(form.password)?,
            full_name: non_empty(form.full_name),
            phone: non_empty(form.phone),
            role: Role::Customer,
            referral_code: generate_referral_code(),
            referred_by: referrer.as_ref().map(|r| r.id),
        };

        let mut tx = self.pool.begin().await?;
        let mut user = UserRepository::create_with(&mut tx, &new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        if let Some(referrer) = &referrer {
            user.loyalty_points = LoyaltyRepository::record(
                &mut tx,
                user.id,
                REFEREE_REWARD_POINTS,
                LedgerReason::ReferralBonus,
                None,
                Some(&format!("{} davetiyle kayıt", referrer.username)),
            )
            .await?;
            LoyaltyRepository::record(
                &mut tx,
                referrer.id,
                REFERRER_REWARD_POINTS,
                LedgerReason::ReferralBonus,
                None,
                Some(&format!("{} davet edildi", user.username)),
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = %user.id, referred = referrer.is_some(), "User registered");
        Ok(user)
    }

    /// Login with a username or email and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login or password is wrong.
    pub async fn login(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_login(login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Create a staff account. Used by the CLI.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input and `AuthError::UserAlreadyExists`
    /// if the username or email is taken.
    pub async fn create_staff(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let new_user = NewUser {
            username: validate_username(username)?,
            email: Email::parse(email)?,
            password_hash: {
                validate_password(password)?;
                hash_password(password)?
            },
            full_name: None,
            phone: None,
            role,
            referral_code: generate_referral_code(),
            referred_by: None,
        };
        self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validate username: 3-32 ASCII letters, digits, `_`, `.` or `-`.
fn validate_username(username: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if !USERNAME_LENGTH.contains(&username.len()) {
        return Err(AuthError::InvalidUsername(format!(
            "Kullanıcı adı {}-{} karakter olmalı",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        )));
    }
    if !username
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
    {
        return Err(AuthError::InvalidUsername(
            "Kullanıcı adı yalnızca harf, rakam, '_', '.' ve '-' içerebilir".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Random referral code such as `K7QZP9LM`.
fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..REFERRAL_ALPHABET.len());
            char::from(REFERRAL_ALPHABET.get(idx).copied().unwrap_or(b'X'))
        })
        .collect()
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("kreatin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("kreatin123", &hash).is_ok());
        assert!(matches!(
            verify_password("kreatin124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(verify_password("kreatin123", "not-a-hash").is_err());
    }

    #[test]
    fn test_password_minimum_counts_characters() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("şifreğüç").is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username("  ayse.k ").unwrap(), "ayse.k");
        assert!(validate_username("ab").is_err());
        assert!(validate_username("ayşe").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_username_errors_are_turkish() {
        let Err(AuthError::InvalidUsername(msg)) = validate_username("ab") else {
            panic!("short username accepted");
        };
        assert_eq!(msg, "Kullanıcı adı 3-32 karakter olmalı");

        let Err(AuthError::InvalidUsername(msg)) = validate_username("ayşe") else {
            panic!("non-ascii username accepted");
        };
        assert!(msg.starts_with("Kullanıcı adı yalnızca"));
    }

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LENGTH);
        assert!(code.bytes().all(|b| REFERRAL_ALPHABET.contains(&b)));
        assert_eq!(normalize_referral_code(&code.to_lowercase()), code);
    }
}
