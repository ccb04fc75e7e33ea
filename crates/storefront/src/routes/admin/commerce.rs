//! Coupons, product bundles and payment methods.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde_json::json;
use tracing::instrument;

use takviye_core::{BundleId, CouponId, PaymentMethodId};

use super::not_found;
use crate::db::bundles::{BundleInput, BundleRepository};
use crate::db::catalog::CatalogRepository;
use crate::db::content::{ContentRepository, PaymentMethodInput};
use crate::db::coupons::{CouponInput, CouponRepository};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::AdminContext;
use crate::models::bundle::Bundle;
use crate::models::content::PaymentMethod;
use crate::models::coupon::Coupon;
use crate::services::audit::AuditAction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route(
            "/coupons/{id}",
            get(show_coupon).put(update_coupon).delete(delete_coupon),
        )
        .route("/bundles", get(list_bundles).post(create_bundle))
        .route(
            "/bundles/{id}",
            get(show_bundle).put(update_bundle).delete(delete_bundle),
        )
        .route(
            "/payment-methods",
            get(list_payment_methods).post(create_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            get(show_payment_method)
                .put(update_payment_method)
                .delete(delete_payment_method),
        )
}

// =============================================================================
// Coupons
// =============================================================================

/// GET /api/admin/coupons
async fn list_coupons(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(CouponRepository::new(state.pool()).list().await?))
}

/// GET /api/admin/coupons/{id}
async fn show_coupon(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<CouponId>,
) -> Result<Json<Coupon>> {
    CouponRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Kupon"))
}

async fn save_coupon(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<CouponId>,
    input: &CouponInput,
) -> Result<Coupon> {
    input.validate().map_err(AppError::BadRequest)?;
    let coupon = CouponRepository::new(state.pool()).save(id, input).await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "coupon",
        coupon.id,
        json!({
            "code": coupon.code,
            "discountType": coupon.discount_type,
            "discountValue": coupon.discount_value,
        }),
    )
    .await;
    Ok(coupon)
}

/// POST /api/admin/coupons
#[instrument(skip(state, ctx, body), fields(code = %body.code))]
async fn create_coupon(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<CouponInput>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let coupon = save_coupon(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// PUT /api/admin/coupons/{id}
#[instrument(skip(state, ctx, body))]
async fn update_coupon(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CouponId>,
    Json(body): Json<CouponInput>,
) -> Result<Json<Coupon>> {
    Ok(Json(save_coupon(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/coupons/{id}
#[instrument(skip(state, ctx))]
async fn delete_coupon(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<CouponId>,
) -> Result<StatusCode> {
    CouponRepository::new(state.pool()).delete(id).await?;
    ctx.audit(&state, AuditAction::Delete, "coupon", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Bundles
// =============================================================================

/// GET /api/admin/bundles
async fn list_bundles(State(state): State<AppState>, _ctx: AdminContext) -> Result<Json<Vec<Bundle>>> {
    Ok(Json(BundleRepository::new(state.pool()).list(false).await?))
}

/// GET /api/admin/bundles/{id}
async fn show_bundle(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<BundleId>,
) -> Result<Json<Bundle>> {
    BundleRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Paket"))
}

/// Every slot needs a positive quantity and an existing product.
async fn check_bundle_items(state: &AppState, input: &BundleInput) -> Result<()> {
    if input.items.is_empty() {
        return Err(AppError::BadRequest("Paket en az bir ürün içermeli".to_string()));
    }
    if input.items.iter().any(|item| item.quantity < 1) {
        return Err(AppError::BadRequest("Ürün adedi en az 1 olmalı".to_string()));
    }

    let ids: Vec<_> = input.items.iter().map(|item| item.product_id).collect();
    let products = CatalogRepository::new(state.pool()).get_products(&ids).await?;
    if let Some(missing) = ids
        .iter()
        .find(|id| !products.iter().any(|p| p.id == **id))
    {
        return Err(AppError::BadRequest(format!("Ürün bulunamadı: {missing}")));
    }
    Ok(())
}

async fn save_bundle(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<BundleId>,
    input: &BundleInput,
) -> Result<Bundle> {
    check_bundle_items(state, input).await?;
    let bundle = BundleRepository::new(state.pool()).save(id, input).await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "bundle",
        bundle.id,
        json!({ "name": bundle.name, "slug": bundle.slug, "price": bundle.price }),
    )
    .await;
    Ok(bundle)
}

/// POST /api/admin/bundles
#[instrument(skip(state, ctx, body), fields(name = %body.name))]
async fn create_bundle(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<BundleInput>,
) -> Result<(StatusCode, Json<Bundle>)> {
    let bundle = save_bundle(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(bundle)))
}

/// PUT /api/admin/bundles/{id}
#[instrument(skip(state, ctx, body))]
async fn update_bundle(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BundleId>,
    Json(body): Json<BundleInput>,
) -> Result<Json<Bundle>> {
    Ok(Json(save_bundle(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/bundles/{id}
#[instrument(skip(state, ctx))]
async fn delete_bundle(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<BundleId>,
) -> Result<StatusCode> {
    BundleRepository::new(state.pool()).delete(id).await?;
    ctx.audit(&state, AuditAction::Delete, "bundle", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Payment methods
// =============================================================================

/// GET /api/admin/payment-methods
async fn list_payment_methods(
    State(state): State<AppState>,
    _ctx: AdminContext,
) -> Result<Json<Vec<PaymentMethod>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_payment_methods(false)
            .await?,
    ))
}

/// GET /api/admin/payment-methods/{id}
async fn show_payment_method(
    State(state): State<AppState>,
    _ctx: AdminContext,
    Path(id): Path<PaymentMethodId>,
) -> Result<Json<PaymentMethod>> {
    ContentRepository::new(state.pool())
        .get_payment_method(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Ödeme yöntemi"))
}

async fn save_payment_method(
    state: &AppState,
    ctx: &AdminContext,
    id: Option<PaymentMethodId>,
    input: &PaymentMethodInput,
) -> Result<PaymentMethod> {
    let method = ContentRepository::new(state.pool())
        .save_payment_method(id, input)
        .await?;
    ctx.audit(
        state,
        AuditAction::for_save(id),
        "payment_method",
        method.id,
        json!({ "kind": method.kind, "name": method.name, "isActive": method.is_active }),
    )
    .await;
    Ok(method)
}

/// POST /api/admin/payment-methods
#[instrument(skip(state, ctx, body))]
async fn create_payment_method(
    State(state): State<AppState>,
    ctx: AdminContext,
    Json(body): Json<PaymentMethodInput>,
) -> Result<(StatusCode, Json<PaymentMethod>)> {
    let method = save_payment_method(&state, &ctx, None, &body).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

/// PUT /api/admin/payment-methods/{id}
#[instrument(skip(state, ctx, body))]
async fn update_payment_method(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<PaymentMethodId>,
    Json(body): Json<PaymentMethodInput>,
) -> Result<Json<PaymentMethod>> {
    Ok(Json(save_payment_method(&state, &ctx, Some(id), &body).await?))
}

/// DELETE /api/admin/payment-methods/{id}
#[instrument(skip(state, ctx))]
async fn delete_payment_method(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<PaymentMethodId>,
) -> Result<StatusCode> {
    ContentRepository::new(state.pool())
        .delete_payment_method(id)
        .await?;
    ctx.audit(&state, AuditAction::Delete, "payment_method", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}
