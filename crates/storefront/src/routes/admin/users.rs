//! Staff and customer accounts.

use axum::{Router, extract::State, routing::{get, put}};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use takviye_core::{Role, UserId};

use super::{ADMIN_PAGE_SIZE, not_found};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::AdminContext;
use crate::models::Paginated;
use crate::models::user::User;
use crate::routes::Pagination;
use crate::services::audit::AuditAction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list))
        .route("/users/{id}", get(show))
        .route("/users/{id}/role", put(update_role))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
}

/// GET /api/admin/users?role=&search=
#[instrument(skip(state, _ctx))]
async fn list(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<UserQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<User>>> {
    Ok(Json(
        UserRepository::new(state.pool())
            .list(
                pagination.request(ADMIN_PAGE_SIZE),
                query.role,
                query.search.as_deref(),
            )
            .await?,
    ))
}

/// GET /api/admin/users/{id}
async fn show(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Kullanıcı"))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Change an account's role. Staff cannot change their own role.
///
/// PUT /api/admin/users/{id}/role
#[instrument(skip(state, ctx))]
async fn update_role(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<UserId>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<User>> {
    if id == ctx.claims.sub {
        return Err(AppError::BadRequest("Kendi rolünüzü değiştiremezsiniz".to_string()));
    }

    let users = UserRepository::new(state.pool());
    let before = users.get_by_id(id).await?.ok_or_else(|| not_found("Kullanıcı"))?;
    let user = users.set_role(id, body.role).await?;
    ctx.audit(
        &state,
        AuditAction::RoleChange,
        "user",
        user.id,
        json!({ "username": user.username, "from": before.role, "to": user.role }),
    )
    .await;
    Ok(Json(user))
}
