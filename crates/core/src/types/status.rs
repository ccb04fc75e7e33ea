//! Status enums for orders and payments.
//!
//! All of these are stored as `TEXT` columns using their `snake_case` names.

use serde::{Deserialize, Serialize};

/// Implements `Display`, `FromStr` and text-column `sqlx` support for a
/// `snake_case` string enum that provides `as_str()` and `ALL`.
#[macro_export]
macro_rules! impl_text_enum {
    ($name:ident, $what:literal) => {
        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| format!(concat!("invalid ", $what, ": {}"), s))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let raw = <&str as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                raw.parse::<Self>().map_err(Into::into)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

/// Order lifecycle status.
///
/// ```text
/// pending -> confirmed -> processing -> shipped -> delivered
///    \___________\____________\
///                              -> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Error returned for a disallowed order status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sipariş durumu {from} -> {to} olarak değiştirilemez")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Turkish label shown to customers and on invoices.
    #[must_use]
    pub const fn label_tr(self) -> &'static str {
        match self {
            Self::Pending => "Beklemede",
            Self::Confirmed => "Onaylandı",
            Self::Processing => "Hazırlanıyor",
            Self::Shipped => "Kargoya Verildi",
            Self::Delivered => "Teslim Edildi",
            Self::Cancelled => "İptal Edildi",
        }
    }

    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Validate a status change.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `next` is not reachable from `self`.
    pub const fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        let allowed = matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        );
        if allowed {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl_text_enum!(OrderStatus, "order status");

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    /// Bank transfer order waiting for the customer's EFT/havale.
    AwaitingTransfer,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::AwaitingTransfer,
        Self::Paid,
        Self::Failed,
        Self::Refunded,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingTransfer => "awaiting_transfer",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    #[must_use]
    pub const fn label_tr(self) -> &'static str {
        match self {
            Self::Pending => "Ödeme Bekleniyor",
            Self::AwaitingTransfer => "Havale Bekleniyor",
            Self::Paid => "Ödendi",
            Self::Failed => "Başarısız",
            Self::Refunded => "İade Edildi",
        }
    }
}

impl_text_enum!(PaymentStatus, "payment status");

/// How the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Credit/debit card charged through the payment gateway.
    Card,
    /// Bank transfer (havale/EFT) to the store's IBAN.
    BankTransfer,
    /// Order is completed over WhatsApp chat.
    Whatsapp,
}

impl PaymentMethodKind {
    pub const ALL: [Self; 3] = [Self::Card, Self::BankTransfer, Self::Whatsapp];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Whatsapp => "whatsapp",
        }
    }

    #[must_use]
    pub const fn label_tr(self) -> &'static str {
        match self {
            Self::Card => "Kredi/Banka Kartı",
            Self::BankTransfer => "Havale/EFT",
            Self::Whatsapp => "WhatsApp Sipariş",
        }
    }

    /// Initial `(order, payment)` statuses for a freshly placed order.
    ///
    /// Card orders are only recorded after the gateway accepted the charge.
    #[must_use]
    pub const fn initial_statuses(self) -> (OrderStatus, PaymentStatus) {
        match self {
            Self::Card => (OrderStatus::Confirmed, PaymentStatus::Paid),
            Self::BankTransfer => (OrderStatus::Pending, PaymentStatus::AwaitingTransfer),
            Self::Whatsapp => (OrderStatus::Pending, PaymentStatus::Pending),
        }
    }
}

impl_text_enum!(PaymentMethodKind, "payment method");

/// Coupon discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub const ALL: [Self; 2] = [Self::Percentage, Self::Fixed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl_text_enum!(DiscountType, "discount type");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut status = OrderStatus::Pending;
        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            status = status.transition_to(next).unwrap();
        }
        assert!(status.is_terminal());
    }

    #[test]
    fn test_cannot_cancel_after_shipping() {
        let err = OrderStatus::Shipped
            .transition_to(OrderStatus::Cancelled)
            .unwrap_err();
        assert_eq!(err.from, OrderStatus::Shipped);
        assert_eq!(err.to, OrderStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for next in OrderStatus::ALL {
            assert!(OrderStatus::Delivered.transition_to(next).is_err());
            assert!(OrderStatus::Cancelled.transition_to(next).is_err());
        }
    }

    #[test]
    fn test_no_skipping_ahead() {
        assert!(
            OrderStatus::Pending
                .transition_to(OrderStatus::Shipped)
                .is_err()
        );
    }

    #[test]
    fn test_text_roundtrip() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert_eq!(
            "bank_transfer".parse::<PaymentMethodKind>().unwrap(),
            PaymentMethodKind::BankTransfer
        );
        assert!("cash".parse::<PaymentMethodKind>().is_err());
    }

    #[test]
    fn test_serde_matches_column_text() {
        let json = serde_json::to_string(&PaymentStatus::AwaitingTransfer).unwrap();
        assert_eq!(json, "\"awaiting_transfer\"");
    }

    #[test]
    fn test_card_orders_start_paid() {
        assert_eq!(
            PaymentMethodKind::Card.initial_statuses(),
            (OrderStatus::Confirmed, PaymentStatus::Paid)
        );
    }
}
