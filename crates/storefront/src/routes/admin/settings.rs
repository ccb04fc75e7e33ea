//! Site settings. Keys under `private.` are only visible here.

use axum::{Router, extract::State, http::StatusCode, routing::{get, put}};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::content::ContentRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::AdminContext;
use crate::models::content::SiteSetting;
use crate::services::audit::AuditAction;
use crate::state::AppState;

const MAX_KEY_LEN: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(list))
        .route("/settings/{key}", put(upsert).delete(remove))
}

fn is_setting_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

/// GET /api/admin/settings
async fn list(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<SiteSetting>>> {
    Ok(Json(ContentRepository::new(state.pool()).list_settings().await?))
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub value: Value,
}

/// Set a key to any JSON value.
///
/// PUT /api/admin/settings/{key}
#[instrument(skip(state, ctx, body))]
async fn upsert(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(key): Path<String>,
    Json(body): Json<SettingRequest>,
) -> Result<Json<SiteSetting>> {
    if !is_setting_key(&key) {
        return Err(AppError::BadRequest("Geçersiz ayar anahtarı".to_string()));
    }

    let setting = ContentRepository::new(state.pool())
        .upsert_setting(&key, &body.value)
        .await?;
    // Values may hold credentials, so only the key is logged.
    ctx.audit(&state, AuditAction::Update, "site_setting", &setting.key, json!({})).await;
    Ok(Json(setting))
}

/// DELETE /api/admin/settings/{key}
#[instrument(skip(state, ctx))]
async fn remove(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool()).delete_setting(&key).await?;
    ctx.audit(&state, AuditAction::Delete, "site_setting", &key, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_keys() {
        assert!(is_setting_key("company"));
        assert!(is_setting_key("private.whatsapp-token"));
        assert!(is_setting_key("free_shipping_threshold"));
        assert!(!is_setting_key(""));
        assert!(!is_setting_key("has space"));
        assert!(!is_setting_key("a/b"));
    }
}
