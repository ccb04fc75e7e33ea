//! Bearer-token extractors.
//!
//! Tokens are JWTs issued at login/registration and sent as
//! `Authorization: Bearer <token>`. Guests identify their cart with the
//! `x-session-id` header instead.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::AppError;
use crate::models::cart::CartOwner;
use crate::services::auth::Claims;
use crate::state::AppState;

/// Header carrying a guest cart id generated by the client.
pub const SESSION_HEADER: &str = "x-session-id";

/// Bearer token from the `Authorization` header, if any.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Guest session id, accepted when 8-128 characters of `[A-Za-z0-9_-]`.
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            (8..=128).contains(&id.len())
                && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

pub(crate) fn unauthorized() -> AppError {
    AppError::Unauthorized("Oturum açmanız gerekiyor".to_string())
}

pub(crate) fn invalid_token() -> AppError {
    AppError::Unauthorized("Oturum geçersiz veya süresi dolmuş".to_string())
}

fn verify(parts: &Parts, state: &AppState) -> Result<Option<Claims>, AppError> {
    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };
    let claims = state.tokens().verify(token).map_err(|_| invalid_token())?;
    Ok(Some(claims))
}

/// Extractor that requires a valid bearer token.
///
/// ```rust,ignore
/// async fn me(RequireAuth(claims): RequireAuth) -> String {
///     claims.username
/// }
/// ```
pub struct RequireAuth(pub Claims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state)?.map(Self).ok_or_else(unauthorized)
    }
}

/// Extractor for routes open to guests. A present but invalid token is
/// still rejected.
pub struct OptionalAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state).map(Self)
    }
}

/// Cart owner: the signed-in user, else the guest session.
pub struct CurrentCartOwner(pub CartOwner);

impl FromRequestParts<AppState> for CurrentCartOwner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = verify(parts, state)? {
            return Ok(Self(CartOwner::User(claims.sub)));
        }
        session_id(&parts.headers)
            .map(|id| Self(CartOwner::Session(id.to_string())))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Giriş yapın veya geçerli bir {SESSION_HEADER} başlığı gönderin"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_session_id_validation() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("guest-3f2a9c71"));
        assert_eq!(session_id(&headers), Some("guest-3f2a9c71"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("short"));
        assert_eq!(session_id(&headers), None);

        headers.insert(SESSION_HEADER, HeaderValue::from_static("guest 3f2a9c71"));
        assert_eq!(session_id(&headers), None);
    }
}
