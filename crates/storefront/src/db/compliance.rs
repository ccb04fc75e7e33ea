//! Newsletter subscriptions, audit logs and KVKK consent records.

use sqlx::PgPool;

use takviye_core::{Email, UserId};

use super::RepositoryError;
use crate::models::compliance::{AuditLog, ConsentRecord, Newsletter};
use crate::models::{PageRequest, Paginated};

/// One audit entry to write.
#[derive(Debug, Clone)]
pub struct AuditEntry<'e> {
    pub user_id: Option<UserId>,
    pub action: &'e str,
    pub entity_type: &'e str,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
}

/// One consent decision to write.
#[derive(Debug, Clone)]
pub struct NewConsent<'c> {
    pub user_id: Option<UserId>,
    pub session_id: Option<&'c str>,
    pub consent_type: &'c str,
    pub granted: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Repository for compliance tables.
pub struct ComplianceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ComplianceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email. Re-subscribing reactivates the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn subscribe(&self, email: &Email) -> Result<Newsletter, RepositoryError> {
        let row = sqlx::query_as::<_, Newsletter>(
            "INSERT INTO newsletters (email) VALUES ($1) \
             ON CONFLICT (email) DO UPDATE SET is_active = TRUE \
             RETURNING id, email, is_active, created_at",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_newsletters(&self, page: PageRequest) -> Result<Paginated<Newsletter>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletters")
            .fetch_one(self.pool)
            .await?;
        let rows = sqlx::query_as::<_, Newsletter>(
            "SELECT id, email, is_active, created_at FROM newsletters \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(page.wrap(rows, total))
    }

    /// Append an audit log row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_audit(&self, entry: &AuditEntry<'_>) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Audit log, newest first, optionally for one entity type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_audit_logs(
        &self,
        entity_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<AuditLog>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE ($1::TEXT IS NULL OR entity_type = $1)",
        )
        .bind(entity_type)
        .fetch_one(self.pool)
        .await?;
        let rows = sqlx::query_as::<_, AuditLog>(
            "SELECT id, user_id, action, entity_type, entity_id, details, ip_address, created_at \
             FROM audit_logs WHERE ($1::TEXT IS NULL OR entity_type = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(entity_type)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(page.wrap(rows, total))
    }

    /// Append a consent decision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_consent(&self, consent: &NewConsent<'_>) -> Result<ConsentRecord, RepositoryError> {
        let row = sqlx::query_as::<_, ConsentRecord>(
            "INSERT INTO consent_records (user_id, session_id, consent_type, granted, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, session_id, consent_type, granted, ip_address, user_agent, created_at",
        )
        .bind(consent.user_id)
        .bind(consent.session_id)
        .bind(consent.consent_type)
        .bind(consent.granted)
        .bind(&consent.ip_address)
        .bind(&consent.user_agent)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_consents(&self, page: PageRequest) -> Result<Paginated<ConsentRecord>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consent_records")
            .fetch_one(self.pool)
            .await?;
        let rows = sqlx::query_as::<_, ConsentRecord>(
            "SELECT id, user_id, session_id, consent_type, granted, ip_address, user_agent, created_at \
             FROM consent_records ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(page.wrap(rows, total))
    }
}
