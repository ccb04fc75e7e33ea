//! Order status changes and their side effects.
//!
//! Status moves follow [`OrderStatus::transition_to`]. Delivering an order
//! credits its earned points; cancelling restores stock and refunds any
//! redeemed points. Each change runs in one transaction with the order row
//! locked.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use takviye_core::loyalty::LedgerReason;
use takviye_core::{OrderId, OrderStatus, TransitionError};

use crate::db::RepositoryError;
use crate::db::catalog::CatalogRepository;
use crate::db::loyalty::LoyaltyRepository;
use crate::db::orders::OrderRepository;
use crate::models::order::Order;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// What a status change must do besides writing the new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusEffects {
    pub restore_stock: bool,
    /// Redeemed points returned to the customer.
    pub refund_points: i32,
    /// Earned points credited to the customer.
    pub credit_points: i32,
}

/// Validate a move and work out its side effects.
///
/// Point effects only apply to orders placed by a signed-in customer.
///
/// # Errors
///
/// Returns `TransitionError` when `next` is not reachable from the current status.
pub fn plan(order: &Order, next: OrderStatus) -> Result<StatusEffects, TransitionError> {
    order.status.transition_to(next)?;
    let has_customer = order.user_id.is_some();

    Ok(match next {
        OrderStatus::Delivered => StatusEffects {
            credit_points: if has_customer { order.points_earned.max(0) } else { 0 },
            ..StatusEffects::default()
        },
        OrderStatus::Cancelled => StatusEffects {
            restore_stock: true,
            refund_points: if has_customer { order.points_used.max(0) } else { 0 },
            ..StatusEffects::default()
        },
        _ => StatusEffects::default(),
    })
}

pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Move an order to `next`, applying stock and loyalty side effects.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Transition` for moves outside the state machine
    /// and `OrderError::Repository` if the order is missing or a write fails.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, next: OrderStatus) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_for_update(&mut tx, id).await?;
        let effects = plan(&order, next)?;

        if effects.restore_stock {
            for item in &order.items {
                CatalogRepository::restore_stock(&mut tx, item.product_id, item.variant_id, item.quantity)
                    .await?;
            }
        }
        if let Some(user_id) = order.user_id {
            if effects.refund_points > 0 {
                let description = format!("{} iptali", order.order_number);
                LoyaltyRepository::record(
                    &mut tx,
                    user_id,
                    effects.refund_points,
                    LedgerReason::OrderRefund,
                    Some(order.id),
                    Some(&description),
                )
                .await?;
            }
            if effects.credit_points > 0 {
                let description = format!("{} siparişinden kazanıldı", order.order_number);
                LoyaltyRepository::record(
                    &mut tx,
                    user_id,
                    effects.credit_points,
                    LedgerReason::OrderEarned,
                    Some(order.id),
                    Some(&description),
                )
                .await?;
            }
        }

        let updated = OrderRepository::set_status(&mut tx, id, next).await?;
        tx.commit().await?;

        tracing::info!(
            order_number = %updated.order_number,
            from = order.status.as_str(),
            to = next.as_str(),
            "Order status changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use takviye_core::UserId;

    use super::*;
    use crate::services::invoice::tests::sample_order;

    fn order(status: OrderStatus, customer: bool) -> Order {
        let mut order = sample_order();
        order.status = status;
        order.user_id = customer.then(|| UserId::new(9));
        order.points_used = 40;
        order.points_earned = 120;
        order
    }

    #[test]
    fn test_delivery_credits_points() {
        let effects = plan(&order(OrderStatus::Shipped, true), OrderStatus::Delivered);
        assert_eq!(
            effects,
            Ok(StatusEffects {
                credit_points: 120,
                ..StatusEffects::default()
            })
        );
    }

    #[test]
    fn test_cancel_restores_stock_and_refunds() {
        let effects = plan(&order(OrderStatus::Confirmed, true), OrderStatus::Cancelled);
        assert_eq!(
            effects,
            Ok(StatusEffects {
                restore_stock: true,
                refund_points: 40,
                credit_points: 0,
            })
        );

        let guest = plan(&order(OrderStatus::Pending, false), OrderStatus::Cancelled);
        assert_eq!(guest.map(|e| e.refund_points), Ok(0));
    }

    #[test]
    fn test_plain_moves_have_no_effects() {
        assert_eq!(
            plan(&order(OrderStatus::Pending, true), OrderStatus::Confirmed),
            Ok(StatusEffects::default())
        );
        assert_eq!(
            plan(&order(OrderStatus::Processing, true), OrderStatus::Shipped),
            Ok(StatusEffects::default())
        );
    }

    #[test]
    fn test_illegal_moves_rejected() {
        assert!(plan(&order(OrderStatus::Shipped, true), OrderStatus::Cancelled).is_err());
        assert!(plan(&order(OrderStatus::Delivered, true), OrderStatus::Pending).is_err());
        assert!(plan(&order(OrderStatus::Pending, true), OrderStatus::Delivered).is_err());
        assert!(plan(&order(OrderStatus::Cancelled, true), OrderStatus::Confirmed).is_err());
    }
}
