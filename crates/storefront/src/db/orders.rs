//! Order repository.

use chrono::Utc;
use rand::Rng;
use sqlx::{PgConnection, PgPool};

use takviye_core::{Money, OrderId, OrderStatus, PaymentStatus, UserId};

use super::{RepositoryError, conflict_on_unique, found, like_pattern};
use crate::models::order::{NewOrder, Order};
use crate::models::{PageRequest, Paginated};

const ORDER_COLUMNS: &str = "id, order_number, user_id, customer_name, customer_email, \
     customer_phone, shipping_address, items, subtotal, discount, shipping_cost, total, \
     coupon_code, points_used, points_earned, payment_method, payment_status, \
     payment_reference, status, tracking_number, notes, created_at, updated_at";

/// Generate a human-friendly order number such as `TK-20250314-4821`.
#[must_use]
pub fn generate_order_number() -> String {
    let suffix: u32 = rand::rng().random_range(1000..10000);
    format!("TK-{}-{suffix}", Utc::now().format("%Y%m%d"))
}

/// Admin order listing filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Matched against order number, customer name and email.
    pub search: Option<String>,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order inside the checkout transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number collides.
    pub async fn insert(conn: &mut PgConnection, order: &NewOrder) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (order_number, user_id, customer_name, customer_email, \
                 customer_phone, shipping_address, items, subtotal, discount, shipping_cost, \
                 total, coupon_code, points_used, points_earned, payment_method, payment_status, \
                 payment_reference, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(sqlx::types::Json(&order.shipping_address))
        .bind(sqlx::types::Json(&order.items))
        .bind(order.subtotal)
        .bind(order.discount)
        .bind(order.shipping_cost)
        .bind(order.total)
        .bind(&order.coupon_code)
        .bind(order.points_used)
        .bind(order.points_earned)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(&order.payment_reference)
        .bind(order.status)
        .bind(&order.notes)
        .fetch_one(conn)
        .await
        .map_err(conflict_on_unique("Sipariş numarası"))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Lock an order row for a status change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn get_for_update(conn: &mut PgConnection, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        found(row)
    }

    /// Get an order by its public number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Guest tracking: the order number and the checkout email must both match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn track(&self, order_number: &str, email: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE order_number = $1 AND LOWER(customer_email) = LOWER($2)"
        ))
        .bind(order_number.trim())
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Admin listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Paginated<Order>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        let conditions = "($1::TEXT IS NULL OR status = $1) \
             AND ($2::TEXT IS NULL OR payment_status = $2) \
             AND ($3::TEXT IS NULL OR order_number ILIKE $3 OR customer_name ILIKE $3 \
                  OR customer_email ILIKE $3)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders WHERE {conditions}"))
                .bind(filter.status)
                .bind(filter.payment_status)
                .bind(&search)
                .fetch_one(self.pool)
                .await?;

        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {conditions} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.status)
        .bind(filter.payment_status)
        .bind(&search)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.wrap(rows, total))
    }

    /// Most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Write a new order status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await?;
        found(row)
    }

    /// Write a new payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET payment_status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;
        found(row)
    }

    /// Set or clear the carrier tracking number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_tracking_number(
        &self,
        id: OrderId,
        tracking_number: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET tracking_number = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(tracking_number)
        .fetch_optional(self.pool)
        .await?;
        found(row)
    }

    /// Order count, revenue of non-cancelled orders and pending order count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<(i64, Money, i64), RepositoryError> {
        let (count, revenue, pending): (i64, Option<Money>, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    SUM(total) FILTER (WHERE status <> 'cancelled'), \
                    COUNT(*) FILTER (WHERE status = 'pending') \
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;
        Ok((count, revenue.unwrap_or(Money::ZERO), pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TK");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[2].parse::<u32>().is_ok_and(|n| (1000..10000).contains(&n)));
    }
}
