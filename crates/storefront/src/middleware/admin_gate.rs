//! Role gate for the back-office API.
//!
//! Every `/api/admin/*` request must carry a bearer token whose role may use
//! the module named by the first path segment (`/api/admin/orders/12` checks
//! `orders`). Tokens that pass are checked again against the role currently
//! stored for the user, so a demotion or deletion takes effect before the
//! token expires. The verified caller is stored in request extensions for
//! [`AdminContext`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use takviye_core::{Role, permissions};

use super::auth::{bearer_token, invalid_token, unauthorized};
use super::rate_limit::client_ip;
use crate::db::users::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::services::audit::{self, Actor, AuditAction};
use crate::services::auth::Claims;
use crate::state::AppState;

/// First path segment below `/api/admin`.
#[must_use]
pub fn module_segment(path: &str) -> &str {
    let rest = path.strip_prefix("/api/admin").unwrap_or(path);
    rest.trim_start_matches('/').split('/').next().unwrap_or_default()
}

/// Swap the token's role for the stored one. A user that no longer exists
/// invalidates the token.
fn with_stored_role(mut claims: Claims, stored: Option<Role>) -> Result<Claims, AppError> {
    let role = stored.ok_or_else(invalid_token)?;
    if role != claims.role {
        tracing::info!(
            user_id = %claims.sub,
            token_role = claims.role.as_str(),
            role = role.as_str(),
            "Role changed since token was issued"
        );
        claims.role = role;
    }
    Ok(claims)
}

fn check_segment(claims: &Claims, segment: &str) -> Result<(), AppError> {
    if permissions::can_access_segment(claims.role, segment) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %claims.sub,
        role = claims.role.as_str(),
        module = segment,
        "Back-office access denied"
    );
    Err(AppError::Forbidden("Bu alana erişim yetkiniz yok".to_string()))
}

pub async fn admin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;
    let claims = state.tokens().verify(token).map_err(|_| invalid_token())?;

    let segment = module_segment(request.uri().path());
    check_segment(&claims, segment)?;

    let stored = UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .map(|user| user.role);
    let claims = with_stored_role(claims, stored)?;
    check_segment(&claims, segment)?;

    set_sentry_user(&claims.sub, Some(&claims.username));
    let ip_address = client_ip(request.headers()).map(|ip| ip.to_string());
    request.extensions_mut().insert(AdminContext { claims, ip_address });

    Ok(next.run(request).await)
}

/// The verified staff member behind a back-office request.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub claims: Claims,
    pub ip_address: Option<String>,
}

impl AdminContext {
    /// Record a change in the audit log.
    pub async fn audit(
        &self,
        state: &AppState,
        action: AuditAction,
        entity_type: &str,
        entity_id: impl ToString,
        details: serde_json::Value,
    ) {
        let actor = Actor {
            user_id: self.claims.sub,
            ip_address: self.ip_address.clone(),
        };
        audit::record(
            state.pool(),
            &actor,
            action,
            entity_type,
            Some(entity_id.to_string()),
            details,
        )
        .await;
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use takviye_core::UserId;

    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: UserId::new(7),
            username: "ayse".to_string(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_stored_role_replaces_token_role() {
        let refreshed = with_stored_role(claims(Role::Admin), Some(Role::Customer)).unwrap();
        assert_eq!(refreshed.role, Role::Customer);
        let err = check_segment(&refreshed, "products").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let same = with_stored_role(claims(Role::Editor), Some(Role::Editor)).unwrap();
        assert!(check_segment(&same, "products").is_ok());
    }

    #[test]
    fn test_deleted_user_token_is_rejected() {
        let err = with_stored_role(claims(Role::SuperAdmin), None).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_module_segment() {
        assert_eq!(module_segment("/api/admin/orders/12/status"), "orders");
        assert_eq!(module_segment("/products"), "products");
        assert_eq!(module_segment("/payment-methods/3"), "payment-methods");
        assert_eq!(module_segment("/api/admin"), "");
        assert_eq!(module_segment("/"), "");
    }
}
