//! Back-office dashboard.

use axum::{Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use takviye_core::Money;

use crate::db::catalog::{CatalogRepository, LOW_STOCK_THRESHOLD};
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::extract::Json;
use crate::middleware::AdminContext;
use crate::models::catalog::Product;
use crate::models::order::Order;
use crate::state::AppState;

const LOW_STOCK_LIMIT: i64 = 10;
const RECENT_ORDERS: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(show))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub order_count: i64,
    /// Total of all non-cancelled orders.
    pub revenue: Money,
    pub pending_orders: i64,
    pub customer_count: i64,
    pub low_stock_threshold: i32,
    pub low_stock: Vec<Product>,
    pub recent_orders: Vec<Order>,
}

/// Store totals and the lists that need attention.
///
/// GET /api/admin/dashboard
#[instrument(skip(state, _ctx))]
async fn show(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Dashboard>> {
    let orders = OrderRepository::new(state.pool());
    let (order_count, revenue, pending_orders) = orders.totals().await?;
    let recent_orders = orders.recent(RECENT_ORDERS).await?;
    let customer_count = UserRepository::new(state.pool()).count_customers().await?;
    let low_stock = CatalogRepository::new(state.pool())
        .low_stock(LOW_STOCK_LIMIT)
        .await?;

    Ok(Json(Dashboard {
        order_count,
        revenue,
        pending_orders,
        customer_count,
        low_stock_threshold: LOW_STOCK_THRESHOLD,
        low_stock,
        recent_orders,
    }))
}
