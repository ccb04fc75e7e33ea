//! Order handling: listing, status changes, payment status, tracking and
//! invoices.

use axum::{Router, extract::State, response::Html, routing::{get, put}};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use takviye_core::{OrderId, OrderStatus, PaymentStatus};

use super::{ADMIN_PAGE_SIZE, not_found};
use crate::db::orders::{OrderFilter, OrderRepository};
use crate::error::Result;
use crate::extract::{Json, Path, Query};
use crate::middleware::AdminContext;
use crate::models::Paginated;
use crate::models::order::Order;
use crate::routes::Pagination;
use crate::routes::api::orders::invoice_html;
use crate::services::audit::AuditAction;
use crate::services::orders::OrderService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/{id}/payment-status", put(update_payment_status))
        .route("/orders/{id}/tracking", put(update_tracking))
        .route("/orders/{id}/invoice", get(invoice))
}

async fn load(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Sipariş"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub search: Option<String>,
}

/// Orders, newest first.
///
/// GET /api/admin/orders?status=&paymentStatus=&search=
#[instrument(skip(state, _ctx))]
async fn list(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Query(query): Query<AdminOrderQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Paginated<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        search: query.search,
    };
    Ok(Json(
        OrderRepository::new(state.pool())
            .list(&filter, pagination.request(ADMIN_PAGE_SIZE))
            .await?,
    ))
}

/// GET /api/admin/orders/{id}
async fn show(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(load(&state, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Move an order along the status machine.
///
/// PUT /api/admin/orders/{id}/status
#[instrument(skip(state, ctx))]
async fn update_status(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let before = load(&state, id).await?;
    let order = OrderService::new(state.pool())
        .update_status(id, body.status)
        .await?;
    ctx.audit(
        &state,
        AuditAction::StatusChange,
        "order",
        order.id,
        json!({
            "orderNumber": order.order_number,
            "from": before.status,
            "to": order.status,
        }),
    )
    .await;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Record a payment outcome, e.g. a received bank transfer.
///
/// PUT /api/admin/orders/{id}/payment-status
#[instrument(skip(state, ctx))]
async fn update_payment_status(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<OrderId>,
    Json(body): Json<PaymentStatusRequest>,
) -> Result<Json<Order>> {
    let before = load(&state, id).await?;
    let order = OrderRepository::new(state.pool())
        .set_payment_status(id, body.payment_status)
        .await?;
    ctx.audit(
        &state,
        AuditAction::Update,
        "order",
        order.id,
        json!({
            "orderNumber": order.order_number,
            "paymentStatus": { "from": before.payment_status, "to": order.payment_status },
        }),
    )
    .await;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub tracking_number: Option<String>,
}

/// Set or clear the carrier tracking number.
///
/// PUT /api/admin/orders/{id}/tracking
#[instrument(skip(state, ctx))]
async fn update_tracking(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<OrderId>,
    Json(body): Json<TrackingRequest>,
) -> Result<Json<Order>> {
    let tracking_number = body
        .tracking_number
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let order = OrderRepository::new(state.pool())
        .set_tracking_number(id, tracking_number)
        .await?;
    ctx.audit(
        &state,
        AuditAction::Update,
        "order",
        order.id,
        json!({ "orderNumber": order.order_number, "trackingNumber": order.tracking_number }),
    )
    .await;
    Ok(Json(order))
}

/// GET /api/admin/orders/{id}/invoice
async fn invoice(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<OrderId>,
) -> Result<Html<String>> {
    let order = load(&state, id).await?;
    invoice_html(&state, &order).await
}
