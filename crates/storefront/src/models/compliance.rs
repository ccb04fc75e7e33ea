//! Newsletter subscriptions, audit logs and KVKK consent records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use takviye_core::{AuditLogId, ConsentRecordId, NewsletterId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    pub id: NewsletterId,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: AuditLogId,
    pub user_id: Option<UserId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub id: ConsentRecordId,
    pub user_id: Option<UserId>,
    pub session_id: Option<String>,
    pub consent_type: String,
    pub granted: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
