//! Read-only compliance records: newsletter subscribers, the audit log and
//! KVKK consent decisions.

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::instrument;

use super::ADMIN_PAGE_SIZE;
use crate::db::compliance::ComplianceRepository;
use crate::error::Result;
use crate::extract::{Json, Query};
use crate::middleware::AdminContext;
use crate::models::Paginated;
use crate::models::compliance::{AuditLog, ConsentRecord, Newsletter};
use crate::routes::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/newsletters", get(newsletters))
        .route("/audit-logs", get(audit_logs))
        .route("/consents", get(consents))
}

/// GET /api/admin/newsletters
async fn newsletters(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<Newsletter>>> {
    Ok(Json(
        ComplianceRepository::new(state.pool())
            .list_newsletters(pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub entity_type: Option<String>,
}

/// GET /api/admin/audit-logs?entityType=
#[instrument(skip(state, _ctx))]
async fn audit_logs(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<AuditLogQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<AuditLog>>> {
    Ok(Json(
        ComplianceRepository::new(state.pool())
            .list_audit_logs(
                query.entity_type.as_deref(),
                pagination.request(ADMIN_PAGE_SIZE),
            )
            .await?,
    ))
}

/// GET /api/admin/consents
async fn consents(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<ConsentRecord>>> {
    Ok(Json(
        ComplianceRepository::new(state.pool())
            .list_consents(pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}
