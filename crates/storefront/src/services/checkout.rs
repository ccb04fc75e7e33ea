//! Checkout: quote the cart, take payment and record the order.
//!
//! Every write (order row, stock, coupon usage, point redemption, cart clear)
//! happens in one transaction. Card payments are charged before that
//! transaction starts, so a failure to record a charged order is logged with
//! the gateway reference for manual follow-up.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use takviye_core::checkout::{PointsRequest, Quote};
use takviye_core::coupon::CouponError;
use takviye_core::loyalty::LedgerReason;
use takviye_core::{Email, Money, PaymentMethodKind};

use crate::config::StorefrontConfig;
use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::content::ContentRepository;
use crate::db::coupons::CouponRepository;
use crate::db::loyalty::LoyaltyRepository;
use crate::db::orders::{OrderRepository, generate_order_number};
use crate::db::users::UserRepository;
use crate::models::cart::{CartLine, CartOwner, CartView};
use crate::models::order::{NewOrder, Order, OrderItem, ShippingAddress};
use crate::services::payment::{Buyer, CardDetails, PaymentClient, PaymentError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Sepetiniz boş")]
    EmptyCart,

    #[error("{0}")]
    Invalid(String),

    #[error("{0} artık satışta değil")]
    Unavailable(String),

    #[error("{name} için yeterli stok yok (kalan: {available})")]
    InsufficientStock { name: String, available: i32 },

    #[error("Geçersiz kupon kodu")]
    UnknownCoupon,

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("{0} ile ödeme şu anda kullanılamıyor")]
    MethodUnavailable(&'static str),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Checkout form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethodKind,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Points the customer wants to spend. Ignored for guests.
    #[serde(default)]
    pub use_points: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

impl CheckoutRequest {
    /// Required-field checks that need no database access.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        let required = [
            (&self.customer_name, "Ad soyad"),
            (&self.customer_phone, "Telefon"),
            (&self.shipping_address.full_name, "Alıcı adı"),
            (&self.shipping_address.phone, "Alıcı telefonu"),
            (&self.shipping_address.city, "İl"),
            (&self.shipping_address.district, "İlçe"),
            (&self.shipping_address.address_line, "Adres"),
        ];
        if let Some((_, label)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(CheckoutError::Invalid(format!("{label} zorunludur")));
        }
        if self.payment_method == PaymentMethodKind::Card && self.card.is_none() {
            return Err(CheckoutError::Invalid("Kart bilgileri zorunludur".to_string()));
        }
        Email::parse(&self.customer_email)
            .map_err(|e| CheckoutError::Invalid(e.to_string()))
    }
}

/// Checkout result returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order: Order,
    pub quote: Quote,
    /// Account details of the active bank-transfer method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<serde_json::Value>,
    /// `wa.me` link with the prefilled order summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_url: Option<String>,
}

/// Cart lines with a quote computed against the shipping policy.
#[must_use]
pub fn cart_view(items: Vec<CartLine>, config: &StorefrontConfig) -> CartView {
    let lines: Vec<_> = items.iter().map(CartLine::quote_line).collect();
    let quote = Quote::build(&lines, Money::ZERO, None, &config.shop.shipping_policy());
    CartView {
        item_count: items.iter().map(|l| l.quantity).sum(),
        items,
        quote,
    }
}

/// Check every line is purchasable in the requested quantity.
///
/// # Errors
///
/// Returns the first unavailable or understocked line.
pub fn check_lines(lines: &[CartLine]) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    for line in lines {
        if !line.product_active {
            return Err(CheckoutError::Unavailable(line.product_name.clone()));
        }
        if line.quantity > line.available_stock() {
            return Err(CheckoutError::InsufficientStock {
                name: line.product_name.clone(),
                available: line.available_stock().max(0),
            });
        }
    }
    Ok(())
}

/// Freeze cart lines into order items.
#[must_use]
pub fn order_items(lines: &[CartLine]) -> Vec<OrderItem> {
    lines
        .iter()
        .map(|line| {
            let quote_line = line.quote_line();
            OrderItem {
                product_id: line.product_id,
                variant_id: line.variant_id,
                name: line.product_name.clone(),
                variant_name: line.variant_name.clone(),
                sku: line.variant_sku.clone().or_else(|| line.product_sku.clone()),
                quantity: line.quantity,
                unit_price: quote_line.unit_price,
                line_total: quote_line.total(),
            }
        })
        .collect()
}

/// Turkish order summary sent over WhatsApp.
#[must_use]
pub fn whatsapp_message(order: &Order) -> String {
    let mut message = format!("Merhaba, sipariş vermek istiyorum.\nSipariş No: {}\n\n", order.order_number);
    for item in &order.items {
        let name = match &item.variant_name {
            Some(variant) => format!("{} ({variant})", item.name),
            None => item.name.clone(),
        };
        message.push_str(&format!(
            "• {name} x{} = {}\n",
            item.quantity,
            item.line_total.display_tl()
        ));
    }
    if !order.discount.is_zero() {
        message.push_str(&format!("\nİndirim: -{}", order.discount.display_tl()));
    }
    message.push_str(&format!("\nKargo: {}", order.shipping_cost.display_tl()));
    message.push_str(&format!("\nToplam: {}\n", order.total.display_tl()));
    message.push_str(&format!(
        "\nAd Soyad: {}\nTelefon: {}\nAdres: {}",
        order.customer_name,
        order.customer_phone,
        order.shipping_address.one_line()
    ));
    message
}

#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!("https://wa.me/{number}?text={}", urlencoding::encode(message))
}

/// Places orders for a cart owner.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    config: &'a StorefrontConfig,
    payments: Option<&'a PaymentClient>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        config: &'a StorefrontConfig,
        payments: Option<&'a PaymentClient>,
    ) -> Self {
        Self {
            pool,
            config,
            payments,
        }
    }

    /// Quote and place an order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for validation, stock, coupon, payment or
    /// database failures. Nothing is written unless every step succeeds.
    #[instrument(skip(self, request), fields(payment_method = request.payment_method.as_str()))]
    pub async fn place_order(
        &self,
        owner: &CartOwner,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let email = request.validate()?;

        let lines = CartRepository::new(self.pool).list(owner).await?;
        check_lines(&lines)?;
        let quote_lines: Vec<_> = lines.iter().map(CartLine::quote_line).collect();
        let subtotal: Money = quote_lines.iter().map(|l| l.total()).sum();

        let coupon_code = match request.coupon_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                let coupon = CouponRepository::new(self.pool)
                    .get_by_code(code)
                    .await?
                    .ok_or(CheckoutError::UnknownCoupon)?;
                let discount = coupon.rules().apply(subtotal, Utc::now())?;
                Some((coupon.code, discount))
            }
            _ => None,
        };
        let coupon_discount = coupon_code.as_ref().map_or(Money::ZERO, |c| c.1);

        let points = match (owner.user_id(), request.use_points) {
            (Some(user_id), Some(requested)) if requested > 0 => {
                let user = UserRepository::new(self.pool)
                    .get_by_id(user_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                Some(PointsRequest {
                    balance: user.loyalty_points,
                    requested,
                })
            }
            _ => None,
        };

        let quote = Quote::build(
            &quote_lines,
            coupon_discount,
            points,
            &self.config.shop.shipping_policy(),
        );

        let order_number = generate_order_number();
        let (status, payment_status) = request.payment_method.initial_statuses();

        let (payment_reference, bank_details) = match request.payment_method {
            PaymentMethodKind::Card => {
                let payments = self
                    .payments
                    .ok_or(CheckoutError::MethodUnavailable(PaymentMethodKind::Card.label_tr()))?;
                let card = request
                    .card
                    .as_ref()
                    .ok_or_else(|| CheckoutError::Invalid("Kart bilgileri zorunludur".to_string()))?;
                let charge = payments
                    .charge(
                        &order_number,
                        quote.total,
                        card,
                        Buyer {
                            name: &request.customer_name,
                            email: email.as_str(),
                            phone: &request.customer_phone,
                        },
                    )
                    .await?;
                (Some(charge.reference), None)
            }
            PaymentMethodKind::BankTransfer => {
                let method = ContentRepository::new(self.pool)
                    .active_payment_method(PaymentMethodKind::BankTransfer)
                    .await?;
                (None, method.map(|m| m.details))
            }
            PaymentMethodKind::Whatsapp => {
                if self.config.shop.whatsapp_number.is_none() {
                    return Err(CheckoutError::MethodUnavailable(
                        PaymentMethodKind::Whatsapp.label_tr(),
                    ));
                }
                (None, None)
            }
        };

        let new_order = NewOrder {
            order_number,
            user_id: owner.user_id(),
            customer_name: request.customer_name.trim().to_string(),
            customer_email: email.into_inner(),
            customer_phone: request.customer_phone.trim().to_string(),
            shipping_address: request.shipping_address,
            items: order_items(&lines),
            subtotal: quote.subtotal,
            discount: quote.coupon_discount + quote.points_discount,
            shipping_cost: quote.shipping,
            total: quote.total,
            coupon_code: coupon_code.map(|c| c.0),
            points_used: quote.points_redeemed,
            points_earned: quote.points_earned,
            payment_method: request.payment_method,
            payment_status,
            payment_reference,
            status,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        let order = match self.record(owner, &new_order).await {
            Ok(order) => order,
            Err(e) => {
                if let Some(reference) = &new_order.payment_reference {
                    tracing::error!(
                        order_number = %new_order.order_number,
                        payment_reference = %reference,
                        error = %e,
                        "Card was charged but the order could not be recorded"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );

        let whatsapp_url = match (request.payment_method, &self.config.shop.whatsapp_number) {
            (PaymentMethodKind::Whatsapp, Some(number)) => {
                Some(whatsapp_link(number, &whatsapp_message(&order)))
            }
            _ => None,
        };

        Ok(CheckoutOutcome {
            order,
            quote,
            bank_details,
            whatsapp_url,
        })
    }

    async fn record(&self, owner: &CartOwner, new_order: &NewOrder) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::insert(&mut tx, new_order).await?;
        for item in &order.items {
            CatalogRepository::decrement_stock(&mut tx, item.product_id, item.variant_id, item.quantity)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => CheckoutError::InsufficientStock {
                        name: item.name.clone(),
                        available: 0,
                    },
                    other => other.into(),
                })?;
        }
        if let Some(code) = &order.coupon_code {
            CouponRepository::record_use(&mut tx, code)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => CheckoutError::Coupon(CouponError::Exhausted),
                    other => other.into(),
                })?;
        }
        if let Some(user_id) = order.user_id
            && order.points_used > 0
        {
            let description = format!("{} siparişinde kullanıldı", order.order_number);
            LoyaltyRepository::record(
                &mut tx,
                user_id,
                -order.points_used,
                LedgerReason::OrderRedeemed,
                Some(order.id),
                Some(&description),
            )
            .await?;
        }
        CartRepository::clear_with(&mut tx, owner).await?;

        tx.commit().await?;
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use takviye_core::{CartItemId, ProductId, VariantId};

    use super::*;
    use crate::config::tests::test_config;
    use crate::services::invoice::tests::sample_order;

    fn line(quantity: i32, stock: i32, variant: Option<(i32, i64)>) -> CartLine {
        CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(3),
            variant_id: variant.map(|(id, _)| VariantId::new(id)),
            quantity,
            product_name: "Whey Protein".to_string(),
            product_slug: "whey-protein".to_string(),
            product_price: Money::from_kurus(60_000),
            product_stock: stock,
            product_active: true,
            product_images: vec![],
            variant_name: variant.map(|_| "Çilek".to_string()),
            variant_price: variant.map(|(_, kurus)| Money::from_kurus(kurus)),
            variant_stock: variant.map(|_| stock),
            variant_sku: variant.map(|_| "WHEY-CLK".to_string()),
            product_sku: Some("WHEY".to_string()),
        }
    }

    fn request() -> CheckoutRequest {
        serde_json::from_value(serde_json::json!({
            "paymentMethod": "bank_transfer",
            "customerName": "Ayşe Yılmaz",
            "customerEmail": "ayse@example.com",
            "customerPhone": "05551112233",
            "shippingAddress": {
                "fullName": "Ayşe Yılmaz",
                "phone": "05551112233",
                "city": "İzmir",
                "district": "Bornova",
                "addressLine": "Kazımdirik Mah. 5"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_request() {
        assert!(request().validate().is_ok());

        let mut missing_city = request();
        missing_city.shipping_address.city = "  ".to_string();
        let err = missing_city.validate().unwrap_err();
        assert_eq!(err.to_string(), "İl zorunludur");

        let mut card_without_details = request();
        card_without_details.payment_method = PaymentMethodKind::Card;
        assert!(matches!(card_without_details.validate(), Err(CheckoutError::Invalid(_))));

        let mut bad_email = request();
        bad_email.customer_email = "ayse".to_string();
        assert!(matches!(bad_email.validate(), Err(CheckoutError::Invalid(_))));
    }

    #[test]
    fn test_check_lines() {
        assert!(matches!(check_lines(&[]), Err(CheckoutError::EmptyCart)));
        assert!(check_lines(&[line(2, 2, None)]).is_ok());
        assert!(matches!(
            check_lines(&[line(3, 2, None)]),
            Err(CheckoutError::InsufficientStock { available: 2, .. })
        ));

        let mut inactive = line(1, 5, None);
        inactive.product_active = false;
        assert!(matches!(check_lines(&[inactive]), Err(CheckoutError::Unavailable(_))));
    }

    #[test]
    fn test_order_items_use_variant_price_and_sku() {
        let items = order_items(&[line(2, 10, Some((7, 65_000))), line(1, 10, None)]);
        assert_eq!(items[0].unit_price, Money::from_kurus(65_000));
        assert_eq!(items[0].line_total, Money::from_kurus(130_000));
        assert_eq!(items[0].sku.as_deref(), Some("WHEY-CLK"));
        assert_eq!(items[0].variant_name.as_deref(), Some("Çilek"));
        assert_eq!(items[1].sku.as_deref(), Some("WHEY"));
        assert_eq!(items[1].line_total, Money::from_kurus(60_000));
    }

    #[test]
    fn test_cart_view_quote() {
        let view = cart_view(vec![line(1, 10, None)], &test_config());
        assert_eq!(view.item_count, 1);
        assert_eq!(view.quote.subtotal, Money::from_kurus(60_000));
        assert!(view.quote.free_shipping);
        assert_eq!(view.quote.total, Money::from_kurus(60_000));
    }

    #[test]
    fn test_whatsapp_link_is_encoded() {
        let order = sample_order();
        let message = whatsapp_message(&order);
        assert!(message.contains("Sipariş No: TK-20250314-4821"));
        assert!(message.contains("Whey Protein <2kg> (Çikolata) x2 = 1.200,00 ₺"));
        assert!(message.contains("Toplam: 1.200,00 ₺"));

        let link = whatsapp_link("905551112233", &message);
        assert!(link.starts_with("https://wa.me/905551112233?text=Merhaba%2C%20sipari%C5%9F"));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
    }
}
