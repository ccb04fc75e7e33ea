//! Customer order history, guest tracking and invoices.

use axum::{Router, extract::State, response::Html, routing::get};
use serde::Deserialize;
use tracing::instrument;

use takviye_core::UserId;

use crate::db::content::ContentRepository;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::models::order::Order;
use crate::services::invoice::{self, SELLER_SETTING_KEY, SellerDetails};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/track", get(track))
        .route("/orders/{order_number}", get(show))
        .route("/orders/{order_number}/invoice", get(invoice))
}

fn order_not_found() -> AppError {
    AppError::NotFound("Sipariş bulunamadı".to_string())
}

/// Render an order's invoice with the seller block from site settings.
pub(crate) async fn invoice_html(state: &AppState, order: &Order) -> Result<Html<String>> {
    let seller = ContentRepository::new(state.pool())
        .get_setting(SELLER_SETTING_KEY)
        .await?;
    let html = invoice::render(order, &SellerDetails::from_setting(seller))?;
    Ok(Html(html))
}

/// GET /api/orders
async fn list(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(claims.sub)
            .await?,
    ))
}

async fn own_order(state: &AppState, order_number: &str, user_id: UserId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get_by_number(order_number)
        .await?
        .filter(|o| o.user_id == Some(user_id))
        .ok_or_else(order_not_found)
}

/// GET /api/orders/{order_number}
async fn show(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Json<Order>> {
    Ok(Json(own_order(&state, &order_number, claims.sub).await?))
}

/// Printable invoice.
///
/// GET /api/orders/{order_number}/invoice
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
async fn invoice(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Html<String>> {
    let order = own_order(&state, &order_number, claims.sub).await?;
    invoice_html(&state, &order).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    pub order_number: String,
    pub email: String,
}

/// Guest order tracking by order number and checkout email.
///
/// GET /api/orders/track?orderNumber=&email=
#[instrument(skip(state, query), fields(order_number = %query.order_number))]
async fn track(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<Order>> {
    if query.order_number.trim().is_empty() || query.email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Sipariş numarası ve e-posta zorunludur".to_string(),
        ));
    }
    OrderRepository::new(state.pool())
        .track(&query.order_number, &query.email)
        .await?
        .map(Json)
        .ok_or_else(order_not_found)
}
