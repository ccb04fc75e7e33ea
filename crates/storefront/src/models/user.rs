//! User accounts and the loyalty ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use takviye_core::loyalty::LedgerReason;
use takviye_core::{Email, LoyaltyTransactionId, OrderId, Role, UserId};

/// A customer or staff account.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub loyalty_points: i32,
    pub referral_code: String,
    pub referred_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub referral_code: String,
    pub referred_by: Option<UserId>,
}

/// A signed change to a user's point balance.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTransaction {
    pub id: LoyaltyTransactionId,
    pub user_id: UserId,
    pub points: i32,
    pub reason: LedgerReason,
    pub order_id: Option<OrderId>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
