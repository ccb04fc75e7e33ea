//! User repository.

use sqlx::PgPool;

use takviye_core::{Email, Role, UserId};

use super::{RepositoryError, conflict_on_unique, like_pattern};
use crate::models::user::{NewUser, User};
use crate::models::{PageRequest, Paginated};

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, phone, role, \
     loyalty_points, referral_code, referred_by, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Find a user by username or email (case-insensitive), for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE LOWER(username) = LOWER($1) OR email = LOWER($1) \
             LIMIT 1"
        ))
        .bind(login.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get the owner of a referral code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_referral_code(&self, code: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE referral_code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username, email or referral
    /// code is taken.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_with(&mut conn, user).await
    }

    /// Insert a user on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username, email or referral
    /// code is taken.
    pub async fn create_with(
        conn: &mut sqlx::PgConnection,
        user: &NewUser,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, full_name, phone, role, \
                                referral_code, referred_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.referral_code)
        .bind(user.referred_by)
        .fetch_one(conn)
        .await
        .map_err(conflict_on_unique("Kullanıcı"))
    }

    /// Update profile fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone: Option<&str>,
        email: Option<&Email>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                full_name = COALESCE($2, full_name), \
                phone = COALESCE($3, phone), \
                email = COALESCE($4, email), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique("E-posta adresi"))?;
        super::found(user)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(self.pool)
        .await?;
        super::found(user)
    }

    /// Replace the password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(hash)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List users, newest first, optionally filtered by role and a search term
    /// matched against username, email and full name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: PageRequest,
        role: Option<Role>,
        search: Option<&str>,
    ) -> Result<Paginated<User>, RepositoryError> {
        let pattern = search.filter(|s| !s.trim().is_empty()).map(like_pattern);
        let filter = "($1::TEXT IS NULL OR role = $1) \
             AND ($2::TEXT IS NULL OR username ILIKE $2 OR email ILIKE $2 OR full_name ILIKE $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
            .bind(role)
            .bind(&pattern)
            .fetch_one(self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {filter} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(role)
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.wrap(users, total))
    }

    /// Number of users who registered with this user's referral code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_referred(&self, id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE referred_by = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Number of registered customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_customers(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'customer'")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
