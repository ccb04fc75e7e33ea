//! Staff account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account (password from ADMIN_PASSWORD)
//! tk-cli admin create -u ayse -e ayse@takviye.com.tr -r super_admin
//!
//! # Promote or demote an existing account
//! tk-cli admin set-role -l ayse -r order_manager
//! ```

use thiserror::Error;

use takviye_core::Role;
use takviye_storefront::db::users::UserRepository;
use takviye_storefront::services::auth::AuthService;

#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid role.
    #[error(
        "Invalid role: {0}. Valid roles: super_admin, admin, editor, order_manager, support, customer"
    )]
    InvalidRole(String),

    /// No password given.
    #[error("No password given: pass --password or set ADMIN_PASSWORD")]
    MissingPassword,

    /// No account matched.
    #[error("No user found for: {0}")]
    UnknownUser(String),
}

fn parse_role(role: &str) -> Result<Role, AdminError> {
    role.parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))
}

/// Create a staff account.
///
/// # Errors
///
/// Returns an error for an invalid role or password, a duplicate account or
/// a database failure.
pub async fn create_user(
    username: &str,
    email: &str,
    role: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = parse_role(role)?;
    let password = password
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or(AdminError::MissingPassword)?;

    let pool = super::connect().await?;
    tracing::info!("Creating staff account: {username} ({})", role.as_str());

    let user = AuthService::new(&pool)
        .create_staff(username, email, &password, role)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role.as_str()
    );
    Ok(())
}

/// Change the role of the account matching `login` (username or email).
///
/// # Errors
///
/// Returns an error for an invalid role, an unknown account or a database
/// failure.
pub async fn set_role(login: &str, role: &str) -> Result<(), Box<dyn std::error::Error>> {
    let role = parse_role(role)?;
    let pool = super::connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_login(login)
        .await?
        .ok_or_else(|| AdminError::UnknownUser(login.to_owned()))?;
    let updated = users.set_role(user.id, role).await?;

    tracing::info!(
        "Role changed: {} {} -> {}",
        updated.username,
        user.role.as_str(),
        updated.role.as_str()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert!(matches!(parse_role("order_manager"), Ok(Role::OrderManager)));
        assert!(matches!(parse_role("viewer"), Err(AdminError::InvalidRole(_))));
    }
}
