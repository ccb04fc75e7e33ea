//! Signed-in customer extras: favorites, loyalty points and referrals.

use axum::{Router, extract::State, http::StatusCode, routing::{delete, get}};
use serde::{Deserialize, Serialize};

use takviye_core::loyalty::{
    LIRA_PER_POINT_EARNED, LedgerReason, REFEREE_REWARD_POINTS, REFERRER_REWARD_POINTS,
    points_value,
};
use takviye_core::{Money, ProductId};

use crate::db::catalog::CatalogRepository;
use crate::db::favorites::FavoriteRepository;
use crate::db::loyalty::LoyaltyRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::catalog::ProductListing;
use crate::models::user::{LoyaltyTransaction, User};
use crate::services::auth::Claims;
use crate::state::AppState;

/// Ledger entries returned with the balance.
const LEDGER_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/{product_id}", delete(remove_favorite))
        .route("/loyalty", get(loyalty))
        .route("/referral", get(referral))
}

async fn current_user(state: &AppState, claims: &Claims) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Kullanıcı bulunamadı".to_string()))
}

/// GET /api/favorites
async fn list_favorites(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<Vec<ProductListing>>> {
    Ok(Json(FavoriteRepository::new(state.pool()).list(claims.sub).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub product_id: ProductId,
}

/// POST /api/favorites
async fn add_favorite(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(body): Json<FavoriteRequest>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool())
        .get_product(body.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;
    FavoriteRepository::new(state.pool())
        .add(claims.sub, body.product_id)
        .await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /api/favorites/{product_id}
async fn remove_favorite(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    FavoriteRepository::new(state.pool())
        .remove(claims.sub, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySummary {
    pub balance: i32,
    /// Lira value of the whole balance.
    pub balance_value: Money,
    /// Lira value of a single point.
    pub point_value: Money,
    /// Lira spent per point earned.
    pub lira_per_point: i64,
    pub transactions: Vec<LoyaltyTransaction>,
}

/// Point balance and recent ledger.
///
/// GET /api/loyalty
async fn loyalty(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<LoyaltySummary>> {
    let user = current_user(&state, &claims).await?;
    let transactions = LoyaltyRepository::new(state.pool())
        .list_for_user(user.id, LEDGER_LIMIT)
        .await?;

    Ok(Json(LoyaltySummary {
        balance: user.loyalty_points,
        balance_value: points_value(user.loyalty_points),
        point_value: points_value(1),
        lira_per_point: LIRA_PER_POINT_EARNED,
        transactions,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummary {
    pub referral_code: String,
    pub referred_count: i64,
    pub earned_points: i64,
    pub referrer_reward: i32,
    pub referee_reward: i32,
}

/// GET /api/referral
async fn referral(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<ReferralSummary>> {
    let user = current_user(&state, &claims).await?;
    let referred_count = UserRepository::new(state.pool())
        .count_referred(user.id)
        .await?;
    let earned_points = LoyaltyRepository::new(state.pool())
        .total_for_reason(user.id, LedgerReason::ReferralBonus)
        .await?;

    Ok(Json(ReferralSummary {
        referral_code: user.referral_code,
        referred_count,
        earned_points,
        referrer_reward: REFERRER_REWARD_POINTS,
        referee_reward: REFEREE_REWARD_POINTS,
    }))
}
