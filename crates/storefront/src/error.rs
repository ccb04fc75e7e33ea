//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use takviye_core::TransitionError;
use takviye_core::coupon::CouponError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::chat::ChatError;
use crate::services::checkout::CheckoutError;
use crate::services::feeds::FeedError;
use crate::services::orders::OrderError;
use crate::services::payment::PaymentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Payment gateway call failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// AI chat call failed.
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Coupon cannot be applied.
    #[error("{0}")]
    Coupon(#[from] CouponError),

    /// Order status change outside the state machine.
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state (stock, duplicates).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An optional integration is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::InvalidReferralCode => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Payment(PaymentError::Declined(_)) => StatusCode::PAYMENT_REQUIRED,
            Self::Payment(_) | Self::Chat(ChatError::Http(_) | ChatError::Api { .. } | ChatError::EmptyReply) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Chat(ChatError::InvalidInput(_)) | Self::BadRequest(_) | Self::Coupon(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Transition(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Kayıt bulunamadı".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Payment(PaymentError::Declined(msg)) => msg.clone(),
            Self::Payment(_) => "Ödeme servisine ulaşılamadı".to_string(),
            Self::Chat(ChatError::InvalidInput(msg)) => msg.clone(),
            Self::Chat(_) => "Danışman şu anda yanıt veremiyor".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Kullanıcı adı veya şifre hatalı".to_string(),
                AuthError::InvalidToken(_) => "Oturum geçersiz veya süresi dolmuş".to_string(),
                AuthError::UserAlreadyExists => {
                    "Bu kullanıcı adı veya e-posta zaten kayıtlı".to_string()
                }
                AuthError::WeakPassword(_) => "Şifre en az 8 karakter olmalı".to_string(),
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::InvalidUsername(msg) => msg.clone(),
                AuthError::InvalidReferralCode => "Geçersiz davet kodu".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::Coupon(e) => e.to_string(),
            Self::Transition(e) => e.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg) => msg.clone(),
            Self::RateLimited => "Çok fazla istek, lütfen biraz bekleyin".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        Self::Internal(format!("template rendering failed: {e}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(RepositoryError::Database(e))
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::Invalid(_) | CheckoutError::UnknownCoupon => {
                Self::BadRequest(e.to_string())
            }
            CheckoutError::Unavailable(_) | CheckoutError::InsufficientStock { .. } => {
                Self::Conflict(e.to_string())
            }
            CheckoutError::MethodUnavailable(_) => Self::ServiceUnavailable(e.to_string()),
            CheckoutError::Coupon(e) => Self::Coupon(e),
            CheckoutError::Payment(e) => Self::Payment(e),
            CheckoutError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Transition(e) => Self::Transition(e),
            OrderError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Repository(e) => Self::Database(e),
            FeedError::Template(e) => e.into(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("ürün".to_string());
        assert_eq!(err.to_string(), "Not found: ürün");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("slug".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::Payment(PaymentError::Declined("yetersiz bakiye".into()))),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(AppError::ServiceUnavailable("kart".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::Coupon(CouponError::Expired)), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_errors_map_to_client_statuses() {
        let status = |e: CheckoutError| AppError::from(e).status();
        assert_eq!(status(CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(CheckoutError::InsufficientStock {
                name: "Kreatin".into(),
                available: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(CheckoutError::MethodUnavailable("Kart")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(CheckoutError::Coupon(CouponError::Expired)),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_body_is_json_and_hides_internals() {
        let response = AppError::Internal("connection refused at 10.0.0.3".into()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));

        let response = AppError::Database(RepositoryError::Conflict(
            "Kupon kodu zaten kullanılıyor".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Kupon kodu zaten kullanılıyor");

        let response = AppError::BadRequest("Sepet boş".into()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Sepet boş");
    }
}
