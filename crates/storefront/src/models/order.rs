//! Orders and their JSON line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use takviye_core::{
    Money, OrderId, OrderStatus, PaymentMethodKind, PaymentStatus, ProductId, UserId, VariantId,
};

/// A purchased line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub name: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub district: String,
    pub address_line: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ShippingAddress {
    /// Single-line form used on invoices and WhatsApp messages.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut line = format!("{}, {}/{}", self.address_line, self.district, self.city);
        if let Some(code) = self.postal_code.as_deref().filter(|c| !c.is_empty()) {
            line.push(' ');
            line.push_str(code);
        }
        line
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[sqlx(json)]
    pub shipping_address: ShippingAddress,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
    pub points_used: i32,
    pub points_earned: i32,
    pub payment_method: PaymentMethodKind,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert an order row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
    pub points_used: i32,
    pub points_earned: i32,
    pub payment_method: PaymentMethodKind,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_one_line() {
        let address = ShippingAddress {
            full_name: "Ayşe Yılmaz".to_string(),
            phone: "05551112233".to_string(),
            city: "İstanbul".to_string(),
            district: "Kadıköy".to_string(),
            address_line: "Moda Cad. No:5".to_string(),
            postal_code: Some("34710".to_string()),
        };
        assert_eq!(address.one_line(), "Moda Cad. No:5, Kadıköy/İstanbul 34710");
    }

    #[test]
    fn test_order_item_json_shape() {
        let item: OrderItem = serde_json::from_str(
            r#"{"productId":3,"name":"Kreatin","quantity":2,"unitPrice":"299.90","lineTotal":"599.80"}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(item.variant_id, None);
        assert_eq!(item.line_total, Money::from_kurus(59_980));
    }
}
