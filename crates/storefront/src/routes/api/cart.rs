//! Cart, coupon validation, payment methods and checkout.
//!
//! Carts belong to the signed-in user or, for guests, to the client's
//! `x-session-id`.

use axum::{Router, extract::State, http::StatusCode, routing::{get, post, put}};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use takviye_core::{CartItemId, DiscountType, Money, ProductId, VariantId};

use crate::db::cart::CartRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::content::ContentRepository;
use crate::db::coupons::CouponRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{Json, Path};
use crate::middleware::CurrentCartOwner;
use crate::models::cart::{CartOwner, CartView};
use crate::models::content::PaymentMethod;
use crate::services::checkout::{CheckoutOutcome, CheckoutRequest, CheckoutService, cart_view};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show).post(add).delete(clear))
        .route("/cart/{id}", put(update).delete(remove))
        .route("/coupons/validate", post(validate_coupon))
        .route("/payment-methods", get(payment_methods))
        .route("/checkout", post(checkout))
}

async fn load(state: &AppState, owner: &CartOwner) -> Result<CartView> {
    let items = CartRepository::new(state.pool()).list(owner).await?;
    Ok(cart_view(items, state.config()))
}

fn invalid_quantity() -> AppError {
    AppError::BadRequest("Adet en az 1 olmalı".to_string())
}

/// Total quantity after adding `adding` to `in_cart`, if stock covers it.
fn checked_total(name: &str, in_cart: i32, adding: i32, available: i32) -> Result<i32> {
    in_cart
        .checked_add(adding)
        .filter(|total| *total <= available)
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "{name} için yeterli stok yok (kalan: {})",
                available.max(0)
            ))
        })
}

/// GET /api/cart
async fn show(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
) -> Result<Json<CartView>> {
    Ok(Json(load(&state, &owner).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

/// Add a product (or variant) to the cart.
///
/// POST /api/cart
#[instrument(skip(state, owner))]
async fn add(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    if body.quantity < 1 {
        return Err(invalid_quantity());
    }

    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .get_product(body.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;

    let available = match body.variant_id {
        Some(variant_id) => {
            catalog
                .get_variant(product.id, variant_id)
                .await?
                .filter(|v| v.is_active)
                .ok_or_else(|| AppError::NotFound("Seçenek bulunamadı".to_string()))?
                .stock
        }
        None => product.stock,
    };

    let carts = CartRepository::new(state.pool());
    let in_cart = carts.quantity_of(&owner, product.id, body.variant_id).await?;
    checked_total(&product.name, in_cart, body.quantity, available)?;

    carts.add(&owner, product.id, body.variant_id, body.quantity).await?;
    add_breadcrumb("cart", "add", Some(&[("product", &product.slug)]));

    Ok(Json(load(&state, &owner).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

/// PUT /api/cart/{id}
async fn update(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    if body.quantity < 1 {
        return Err(invalid_quantity());
    }

    let carts = CartRepository::new(state.pool());
    let lines = carts.list(&owner).await?;
    let line = lines
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(|| AppError::NotFound("Sepet satırı bulunamadı".to_string()))?;
    checked_total(&line.product_name, 0, body.quantity, line.available_stock())?;

    carts.update_quantity(&owner, id, body.quantity).await?;
    Ok(Json(load(&state, &owner).await?))
}

/// DELETE /api/cart/{id}
async fn remove(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    CartRepository::new(state.pool()).remove(&owner, id).await?;
    Ok(Json(load(&state, &owner).await?))
}

/// DELETE /api/cart
async fn clear(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(&owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount: Money,
}

/// Check a coupon against a subtotal.
///
/// POST /api/coupons/validate
#[instrument(skip(state, body), fields(code = %body.code))]
async fn validate_coupon(
    State(state): State<AppState>,
    Json(body): Json<ValidateCouponRequest>,
) -> Result<Json<CouponQuote>> {
    let coupon = CouponRepository::new(state.pool())
        .get_by_code(&body.code)
        .await?
        .ok_or_else(|| AppError::BadRequest("Geçersiz kupon kodu".to_string()))?;
    let discount = coupon.rules().apply(body.subtotal, Utc::now())?;

    Ok(Json(CouponQuote {
        code: coupon.code,
        description: coupon.description,
        discount_type: coupon.discount_type,
        discount,
    }))
}

/// GET /api/payment-methods
async fn payment_methods(State(state): State<AppState>) -> Result<Json<Vec<PaymentMethod>>> {
    Ok(Json(
        ContentRepository::new(state.pool())
            .list_payment_methods(true)
            .await?,
    ))
}

/// Place an order from the current cart.
///
/// POST /api/checkout
async fn checkout(
    State(state): State<AppState>,
    CurrentCartOwner(owner): CurrentCartOwner,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutOutcome>)> {
    let outcome = CheckoutService::new(state.pool(), state.config(), state.payments())
        .place_order(&owner, body)
        .await?;
    add_breadcrumb(
        "checkout",
        "order placed",
        Some(&[("order_number", &outcome.order.order_number)]),
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_total_within_stock() {
        assert_eq!(checked_total("Kreatin", 2, 3, 5).unwrap(), 5);
        assert_eq!(checked_total("Kreatin", 0, 1, 1).unwrap(), 1);
    }

    #[test]
    fn test_checked_total_over_stock_is_conflict() {
        let err = checked_total("Kreatin", 4, 2, 5).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Conflict: Kreatin için yeterli stok yok (kalan: 5)");

        let err = checked_total("Kreatin", 0, 1, -3).unwrap_err();
        assert!(err.to_string().ends_with("(kalan: 0)"));
    }

    #[test]
    fn test_checked_total_overflow_is_conflict() {
        let err = checked_total("Omega 3", 10, i32::MAX, i32::MAX).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let err = checked_total("Omega 3", i32::MAX, 1, i32::MAX).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
