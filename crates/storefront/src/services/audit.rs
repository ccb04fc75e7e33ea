//! Back-office audit trail.

use serde_json::Value;
use sqlx::PgPool;

use takviye_core::UserId;

use crate::db::compliance::{AuditEntry, ComplianceRepository};

/// Kind of change recorded in `audit_logs.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Approve,
    Reject,
    RoleChange,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::StatusChange => "status_change",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RoleChange => "role_change",
        }
    }

    /// `Create` when no id was given, else `Update`.
    #[must_use]
    pub fn for_save<T>(id: Option<T>) -> Self {
        if id.is_some() { Self::Update } else { Self::Create }
    }

    #[must_use]
    pub const fn for_approval(approved: bool) -> Self {
        if approved { Self::Approve } else { Self::Reject }
    }
}

/// Who made a change and from where.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
    pub ip_address: Option<String>,
}

/// Write one audit row.
///
/// The change has already been committed when this runs, so a failed insert
/// is logged and captured to Sentry instead of failing the request.
pub async fn record(
    pool: &PgPool,
    actor: &Actor,
    action: AuditAction,
    entity_type: &str,
    entity_id: Option<String>,
    details: Value,
) {
    let entry = AuditEntry {
        user_id: Some(actor.user_id),
        action: action.as_str(),
        entity_type,
        entity_id,
        details,
        ip_address: actor.ip_address.clone(),
    };
    if let Err(e) = ComplianceRepository::new(pool).record_audit(&entry).await {
        sentry::capture_error(&e);
        tracing::error!(
            error = %e,
            action = action.as_str(),
            entity_type,
            "Failed to write audit log"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_helpers() {
        assert_eq!(AuditAction::for_save::<i32>(None), AuditAction::Create);
        assert_eq!(AuditAction::for_save(Some(4)), AuditAction::Update);
        assert_eq!(AuditAction::for_approval(false).as_str(), "reject");
        assert_eq!(AuditAction::StatusChange.as_str(), "status_change");
    }
}
