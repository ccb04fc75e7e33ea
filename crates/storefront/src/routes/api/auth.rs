//! Customer registration, login and profile.

use axum::{Router, extract::State, http::{HeaderMap, StatusCode}, routing::{get, post, put}};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use takviye_core::Email;

use crate::db::cart::CartRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::middleware::auth::session_id;
use crate::models::user::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Move a guest cart onto the account that just signed in.
async fn adopt_guest_cart(state: &AppState, headers: &HeaderMap, user: &User) {
    let Some(session) = session_id(headers) else {
        return;
    };
    if let Err(e) = CartRepository::new(state.pool()).adopt_session(session, user.id).await {
        tracing::warn!(error = %e, user_id = %user.id, "Failed to adopt guest cart");
    }
}

/// Create a customer account.
///
/// POST /api/auth/register
#[instrument(skip(state, headers, body), fields(username = %body.username))]
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&Registration {
            username: &body.username,
            email: &body.email,
            password: &body.password,
            full_name: body.full_name.as_deref(),
            phone: body.phone.as_deref(),
            referral_code: body.referral_code.as_deref(),
        })
        .await?;

    adopt_guest_cart(&state, &headers, &user).await;
    let token = state.tokens().issue(&user)?;
    set_sentry_user(&user.id, Some(&user.username));

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Log in with username or email.
///
/// POST /api/auth/login
#[instrument(skip(state, headers, body), fields(login = %body.username))]
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login(body.username.trim(), &body.password)
        .await
        .inspect_err(|_| tracing::info!("Failed login attempt"))?;

    adopt_guest_cart(&state, &headers, &user).await;
    let token = state.tokens().issue(&user)?;
    set_sentry_user(&user.id, Some(&user.username));
    add_breadcrumb("auth", "login", None);

    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me
async fn me(State(state): State<AppState>, RequireAuth(claims): RequireAuth) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Kullanıcı bulunamadı".to_string()))?;
    Ok(Json(user))
}

/// Update name, phone or email.
///
/// PUT /api/auth/profile
#[instrument(skip(state, claims, body), fields(user_id = %claims.sub))]
async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(body): Json<ProfileRequest>,
) -> Result<Json<User>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = UserRepository::new(state.pool())
        .update_profile(
            claims.sub,
            body.full_name.as_deref(),
            body.phone.as_deref(),
            email.as_ref(),
        )
        .await?;
    Ok(Json(user))
}
