//! Printable order invoices.

use askama::Template;
use serde::Deserialize;

use takviye_core::pricing::vat_included;

use crate::models::order::Order;

/// `site_settings` key holding the seller block printed on invoices.
pub const SELLER_SETTING_KEY: &str = "company";

/// Seller identity from the `company` site setting. Missing fields print empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerDetails {
    pub name: String,
    pub address: String,
    pub tax_office: String,
    pub tax_number: String,
    pub phone: String,
    pub email: String,
}

impl SellerDetails {
    /// Parse the stored setting, falling back to an empty block.
    #[must_use]
    pub fn from_setting(value: Option<serde_json::Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

struct InvoiceLine {
    name: String,
    quantity: i32,
    unit_price: String,
    line_total: String,
}

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    seller: &'a SellerDetails,
    order_number: &'a str,
    date: String,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    address: String,
    lines: Vec<InvoiceLine>,
    subtotal: String,
    discount: Option<String>,
    shipping: String,
    net: String,
    vat: String,
    vat_rate: u32,
    total: String,
    payment_method: &'static str,
    payment_status: &'static str,
}

/// Render the HTML invoice for an order.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render(order: &Order, seller: &SellerDetails) -> Result<String, askama::Error> {
    let breakdown = vat_included(order.total);
    let lines = order
        .items
        .iter()
        .map(|item| InvoiceLine {
            name: match &item.variant_name {
                Some(variant) => format!("{} ({variant})", item.name),
                None => item.name.clone(),
            },
            quantity: item.quantity,
            unit_price: item.unit_price.display_tl(),
            line_total: item.line_total.display_tl(),
        })
        .collect();

    InvoiceTemplate {
        seller,
        order_number: &order.order_number,
        date: order.created_at.format("%d.%m.%Y").to_string(),
        customer_name: &order.customer_name,
        customer_email: &order.customer_email,
        customer_phone: &order.customer_phone,
        address: order.shipping_address.one_line(),
        lines,
        subtotal: order.subtotal.display_tl(),
        discount: (!order.discount.is_zero()).then(|| order.discount.display_tl()),
        shipping: order.shipping_cost.display_tl(),
        net: breakdown.net.display_tl(),
        vat: breakdown.vat.display_tl(),
        vat_rate: breakdown.rate_percent,
        total: breakdown.gross.display_tl(),
        payment_method: order.payment_method.label_tr(),
        payment_status: order.payment_status.label_tr(),
    }
    .render()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};
    use takviye_core::{
        Money, OrderId, OrderStatus, PaymentMethodKind, PaymentStatus, ProductId,
    };

    use super::*;
    use crate::models::order::{OrderItem, ShippingAddress};

    pub(crate) fn sample_order() -> Order {
        let created = Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap();
        Order {
            id: OrderId::new(1),
            order_number: "TK-20250314-4821".to_string(),
            user_id: None,
            customer_name: "Mehmet Öz & Ortakları".to_string(),
            customer_email: "mehmet@example.com".to_string(),
            customer_phone: "05321234567".to_string(),
            shipping_address: ShippingAddress {
                full_name: "Mehmet Öz".to_string(),
                phone: "05321234567".to_string(),
                city: "Ankara".to_string(),
                district: "Çankaya".to_string(),
                address_line: "Tunalı Hilmi Cad. 12/4".to_string(),
                postal_code: None,
            },
            items: vec![OrderItem {
                product_id: ProductId::new(3),
                variant_id: None,
                name: "Whey Protein <2kg>".to_string(),
                variant_name: Some("Çikolata".to_string()),
                sku: None,
                quantity: 2,
                unit_price: Money::from_kurus(60_000),
                line_total: Money::from_kurus(120_000),
            }],
            subtotal: Money::from_kurus(120_000),
            discount: Money::ZERO,
            shipping_cost: Money::ZERO,
            total: Money::from_kurus(120_000),
            coupon_code: None,
            points_used: 0,
            points_earned: 120,
            payment_method: PaymentMethodKind::BankTransfer,
            payment_status: PaymentStatus::AwaitingTransfer,
            payment_reference: None,
            status: OrderStatus::Pending,
            tracking_number: None,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_invoice_contains_vat_breakdown() {
        let seller = SellerDetails {
            name: "Takviye Gıda A.Ş.".to_string(),
            tax_number: "1234567890".to_string(),
            ..SellerDetails::default()
        };
        let html = render(&sample_order(), &seller).unwrap();

        assert!(html.contains("TK-20250314-4821"));
        assert!(html.contains("14.03.2025"));
        assert!(html.contains("1.000,00 ₺"));
        assert!(html.contains("200,00 ₺"));
        assert!(html.contains("1.200,00 ₺"));
        assert!(html.contains("KDV (%20)"));
        assert!(html.contains("1234567890"));
        assert!(html.contains("Havale/EFT"));
    }

    #[test]
    fn test_invoice_escapes_text() {
        let html = render(&sample_order(), &SellerDetails::default()).unwrap();
        assert!(html.contains("Whey Protein &lt;2kg&gt; (Çikolata)"));
        assert!(html.contains("Mehmet Öz &amp; Ortakları"));
        assert!(!html.contains("<2kg>"));
    }

    #[test]
    fn test_seller_from_setting() {
        let seller = SellerDetails::from_setting(Some(serde_json::json!({
            "name": "Takviye",
            "taxOffice": "Kadıköy"
        })));
        assert_eq!(seller.tax_office, "Kadıköy");
        assert!(seller.address.is_empty());
        assert_eq!(SellerDetails::from_setting(None), SellerDetails::default());
        assert_eq!(
            SellerDetails::from_setting(Some(serde_json::json!("bozuk"))),
            SellerDetails::default()
        );
    }
}
