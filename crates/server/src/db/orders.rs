//! Order repository for database operations.
//!
//! Orders and their line items are written in one transaction so a failed
//! line insert never leaves a headless order behind. Reads return orders
//! with lines already attached.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use foodcart_core::{OrderId, OrderStatus, PaymentMethod, PhoneNumber, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderLine, OrderWithLines};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    firstname: String,
    lastname: String,
    address: String,
    phonenumber: Option<String>,
    comment: String,
    status: i16,
    payment_by_card: bool,
    registered_at: DateTime<Utc>,
    called_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_code(row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "unknown order status code in database: {}",
                row.status
            ))
        })?;

        let phonenumber = row
            .phonenumber
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone number in database: {e}"))
            })?;

        Ok(Self {
            id: OrderId::new(row.id),
            firstname: row.firstname,
            lastname: row.lastname,
            address: row.address,
            phonenumber,
            comment: row.comment,
            status,
            payment: PaymentMethod::from_card_flag(row.payment_by_card),
            registered_at: row.registered_at,
            called_at: row.called_at,
            delivered_at: row.delivered_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and its line items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back and nothing is stored.
    pub async fn create(&self, new_order: &NewOrder) -> Result<OrderWithLines, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO customer_order
                (firstname, lastname, address, phonenumber, comment, status, payment_by_card)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, firstname, lastname, address, phonenumber, comment,
                      status, payment_by_card, registered_at, called_at, delivered_at
            ",
        )
        .bind(&new_order.firstname)
        .bind(&new_order.lastname)
        .bind(&new_order.address)
        .bind(new_order.phonenumber.as_ref().map(PhoneNumber::as_str))
        .bind(&new_order.comment)
        .bind(new_order.status.code())
        .bind(new_order.payment.as_card_flag())
        .fetch_one(&mut *tx)
        .await?;

        for line in &new_order.lines {
            sqlx::query(
                r"
                INSERT INTO order_item (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(row.id)
            .bind(line.product_id.as_i32())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let order = Order::try_from(row)?;
        let lines = new_order
            .lines
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(OrderWithLines { order, lines })
    }

    /// All non-completed orders with their line items, ordered by status
    /// code ascending, then by registration time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status code or
    /// phone number cannot be decoded.
    pub async fn list_active_with_lines(&self) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, firstname, lastname, address, phonenumber, comment,
                   status, payment_by_card, registered_at, called_at, delivered_at
            FROM customer_order
            WHERE status >= 0
            ORDER BY status, registered_at, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT order_id, product_id, quantity, unit_price
            FROM order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, product_id
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for line_row in line_rows {
            lines_by_order
                .entry(line_row.order_id)
                .or_default()
                .push(OrderLine::from(line_row));
        }

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            let order = Order::try_from(row)?;
            orders.push(OrderWithLines { order, lines });
        }

        Ok(orders)
    }
}
