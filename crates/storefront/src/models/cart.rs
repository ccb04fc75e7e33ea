//! Cart rows.

use serde::Serialize;
use sqlx::FromRow;

use takviye_core::checkout::{Quote, QuoteLine};
use takviye_core::pricing::unit_price;
use takviye_core::{CartItemId, Money, ProductId, UserId, VariantId};

/// A cart row joined with the product and variant it points at.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i32,
    pub product_name: String,
    pub product_slug: String,
    pub product_price: Money,
    pub product_stock: i32,
    pub product_active: bool,
    #[sqlx(json)]
    pub product_images: Vec<String>,
    pub variant_name: Option<String>,
    pub variant_price: Option<Money>,
    pub variant_stock: Option<i32>,
    pub variant_sku: Option<String>,
    pub product_sku: Option<String>,
}

impl CartLine {
    /// Variant price when a variant is chosen, else the product price.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        unit_price(self.product_price, self.variant_price)
    }

    /// Stock of the chosen variant, or of the product.
    #[must_use]
    pub fn available_stock(&self) -> i32 {
        self.variant_stock.unwrap_or(self.product_stock)
    }

    #[must_use]
    pub fn quote_line(&self) -> QuoteLine {
        QuoteLine {
            unit_price: self.unit_price(),
            quantity: u32::try_from(self.quantity).unwrap_or(0),
        }
    }
}

/// Cart payload: lines plus the current quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub item_count: i32,
    pub quote: Quote,
}

/// Who a cart belongs to: a signed-in user or a guest session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserId),
    Session(String),
}

impl CartOwner {
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(id) => Some(id),
        }
    }
}
