//! # Order Repository
//!
//! Persistence of the order aggregate: one `orders` header row plus its
//! `order_lines`, always read and written together.
//!
//! ## Aggregate Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Aggregate Storage                           │
//! │                                                                         │
//! │  CREATE   sequence::next_order_sequence   (first statement: lock)      │
//! │           insert_order_header ──► id                                   │
//! │           insert_order_lines  (position 0..n keeps request order)      │
//! │                                                                         │
//! │  UPDATE   touch_order           (first statement: lock + exists?)      │
//! │           update_order_header                                          │
//! │           replace_order_lines   (delete all, insert all)               │
//! │                                                                         │
//! │  STATUS   touch_order ──► fetch_order ──► set_order_status             │
//! │                                                                         │
//! │  DELETE   delete_order          (lines go with ON DELETE CASCADE)      │
//! │                                                                         │
//! │  READ     fetch_order / fetch_orders inside one read transaction       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Names and units on lines are snapshots. Nothing here joins back to
//! customers, employees or items when reading.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use super::{format_timestamp, parse_timestamp};
use crate::error::{DbError, DbResult};
use quotation_core::{ActorRef, EntityId, Money, Order, OrderLine, OrderStatus, TaxRate};

// =============================================================================
// Records
// =============================================================================

const ORDER_COLUMNS: &str = "id, order_number, customer_id, customer_name, employee_id, \
    employee_name, subtotal_cents, tax_enabled, tax_rate, tax_cents, total_cents, status, \
    billing_date, notes, created_by, created_at, updated_at";

const LINE_COLUMNS: &str =
    "order_id, item_id, item_name, unit, quantity, price_cents, total_cents";

#[derive(Debug, sqlx::FromRow)]
struct OrderRecord {
    id: i64,
    order_number: String,
    customer_id: i64,
    customer_name: String,
    employee_id: Option<i64>,
    employee_name: Option<String>,
    subtotal_cents: i64,
    tax_enabled: bool,
    tax_rate: i64,
    tax_cents: i64,
    total_cents: i64,
    status: OrderStatus,
    billing_date: NaiveDate,
    notes: Option<String>,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl OrderRecord {
    fn into_order(self, items: Vec<OrderLine>) -> DbResult<Order> {
        let tax_rate = u32::try_from(self.tax_rate)
            .map(TaxRate::from_percent)
            .map_err(|_| DbError::corrupt("orders", format!("tax_rate {}", self.tax_rate)))?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            items,
            subtotal: Money::from_cents(self.subtotal_cents),
            tax_enabled: self.tax_enabled,
            tax_rate,
            tax_amount: Money::from_cents(self.tax_cents),
            total: Money::from_cents(self.total_cents),
            status: self.status,
            billing_date: self.billing_date,
            notes: self.notes,
            created_by: ActorRef::new(self.created_by),
            created_at: parse_timestamp("orders", &self.created_at)?,
            updated_at: parse_timestamp("orders", &self.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRecord {
    order_id: i64,
    item_id: i64,
    item_name: String,
    unit: Option<String>,
    quantity: i64,
    price_cents: i64,
    total_cents: i64,
}

impl From<LineRecord> for OrderLine {
    fn from(record: LineRecord) -> Self {
        OrderLine {
            item_id: record.item_id,
            item_name: record.item_name,
            quantity: record.quantity,
            price: Money::from_cents(record.price_cents),
            unit: record.unit,
            total: Money::from_cents(record.total_cents),
        }
    }
}

/// Which orders a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Customer(EntityId),
    Status(OrderStatus),
}

impl OrderFilter {
    fn push_where(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            OrderFilter::All => {}
            OrderFilter::Customer(customer_id) => {
                query.push(" WHERE customer_id = ").push_bind(customer_id);
            }
            OrderFilter::Status(status) => {
                query.push(" WHERE status = ").push_bind(status);
            }
        }
    }
}

// =============================================================================
// Writes
// =============================================================================

/// Inserts the header row of `order` and returns the new id.
///
/// `order.id` and `order.items` are ignored. A taken order number surfaces
/// as `DbError::UniqueViolation { field: "orders.order_number", .. }`.
pub async fn insert_order_header<'e, E>(executor: E, order: &Order) -> DbResult<EntityId>
where
    E: SqliteExecutor<'e>,
{
    debug!(order_number = %order.order_number, customer_id = order.customer_id, "Inserting order");

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (
            order_number, customer_id, customer_name, employee_id, employee_name,
            subtotal_cents, tax_enabled, tax_rate, tax_cents, total_cents,
            status, billing_date, notes, created_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16
        )
        RETURNING id
        "#,
    )
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(&order.customer_name)
    .bind(order.employee_id)
    .bind(&order.employee_name)
    .bind(order.subtotal.cents())
    .bind(order.tax_enabled)
    .bind(i64::from(order.tax_rate.percent()))
    .bind(order.tax_amount.cents())
    .bind(order.total.cents())
    .bind(order.status)
    .bind(order.billing_date)
    .bind(&order.notes)
    .bind(order.created_by.as_str())
    .bind(format_timestamp(order.created_at))
    .bind(format_timestamp(order.updated_at))
    .fetch_one(executor)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: order.order_number.clone(),
        },
        other => other,
    })?;

    Ok(id)
}

/// Inserts `lines` for `order_id`, numbering positions in slice order.
pub async fn insert_order_lines(
    conn: &mut SqliteConnection,
    order_id: EntityId,
    lines: &[OrderLine],
) -> DbResult<()> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_lines \
             (order_id, position, item_id, item_name, unit, quantity, price_cents, total_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(order_id)
        .bind(position as i64)
        .bind(line.item_id)
        .bind(&line.item_name)
        .bind(&line.unit)
        .bind(line.quantity)
        .bind(line.price.cents())
        .bind(line.total.cents())
        .execute(&mut *conn)
        .await?;
    }

    debug!(order_id, lines = lines.len(), "Inserted order lines");
    Ok(())
}

/// Replaces every line of `order_id` with `lines`.
pub async fn replace_order_lines(
    conn: &mut SqliteConnection,
    order_id: EntityId,
    lines: &[OrderLine],
) -> DbResult<()> {
    sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    insert_order_lines(conn, order_id, lines).await
}

/// Bumps `updated_at` of an order. Returns false if it does not exist.
///
/// As the first statement of a write transaction this takes the write lock
/// and checks existence in one step.
pub async fn touch_order<'e, E>(executor: E, id: EntityId, at: DateTime<Utc>) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE orders SET updated_at = ?2 WHERE id = ?1")
        .bind(id)
        .bind(format_timestamp(at))
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrites the mutable header fields of an existing order.
///
/// Order number, tax rate, status, billing date, creator and creation time
/// are left as stored.
pub async fn update_order_header<'e, E>(executor: E, order: &Order) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE orders SET
            customer_id = ?2,
            customer_name = ?3,
            employee_id = ?4,
            employee_name = ?5,
            subtotal_cents = ?6,
            tax_enabled = ?7,
            tax_cents = ?8,
            total_cents = ?9,
            notes = ?10,
            updated_at = ?11
        WHERE id = ?1
        "#,
    )
    .bind(order.id)
    .bind(order.customer_id)
    .bind(&order.customer_name)
    .bind(order.employee_id)
    .bind(&order.employee_name)
    .bind(order.subtotal.cents())
    .bind(order.tax_enabled)
    .bind(order.tax_amount.cents())
    .bind(order.total.cents())
    .bind(&order.notes)
    .bind(format_timestamp(order.updated_at))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Sets the status of an order. `notes`, when given, replaces the stored notes.
pub async fn set_order_status<'e, E>(
    executor: E,
    id: EntityId,
    status: OrderStatus,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE orders SET status = ?2, notes = COALESCE(?3, notes), updated_at = ?4 WHERE id = ?1",
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .bind(format_timestamp(at))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes an order and, by cascade, its lines. Returns false if absent.
pub async fn delete_order<'e, E>(executor: E, id: EntityId) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Reads
// =============================================================================

/// Loads one order with its lines in position order.
pub async fn fetch_order(conn: &mut SqliteConnection, id: EntityId) -> DbResult<Option<Order>> {
    let header: Option<OrderRecord> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(header) = header else {
        return Ok(None);
    };

    let lines: Vec<LineRecord> = sqlx::query_as(&format!(
        "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY position"
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    header
        .into_order(lines.into_iter().map(OrderLine::from).collect())
        .map(Some)
}

/// Loads every order matching `filter`, newest first (`created_at`, then id).
///
/// Lines for all returned orders are fetched with one query.
pub async fn fetch_orders(conn: &mut SqliteConnection, filter: OrderFilter) -> DbResult<Vec<Order>> {
    let mut header_query = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    filter.push_where(&mut header_query);
    header_query.push(" ORDER BY created_at DESC, id DESC");

    let headers: Vec<OrderRecord> = header_query
        .build_query_as()
        .fetch_all(&mut *conn)
        .await?;

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut line_query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id IN (SELECT id FROM orders"
    ));
    filter.push_where(&mut line_query);
    line_query.push(") ORDER BY order_id, position");

    let lines: Vec<LineRecord> = line_query.build_query_as().fetch_all(&mut *conn).await?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLine::from(line));
    }

    headers
        .into_iter()
        .map(|header| {
            let items = lines_by_order.remove(&header.id).unwrap_or_default();
            header.into_order(items)
        })
        .collect()
}

/// Number of stored orders. Diagnostic only; never used for numbering.
pub async fn count_orders<'e, E>(executor: E) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

// =============================================================================
// Repository
// =============================================================================

/// Read-side repository for orders.
///
/// Every read runs in its own transaction so header and lines come from
/// the same snapshot. Writes go through the service, which owns the
/// transaction boundary.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its lines.
    pub async fn get_by_id(&self, id: EntityId) -> DbResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;
        let order = fetch_order(&mut tx, id).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        self.list_where(OrderFilter::All).await
    }

    /// Orders quoted for one customer, newest first.
    pub async fn list_for_customer(&self, customer_id: EntityId) -> DbResult<Vec<Order>> {
        self.list_where(OrderFilter::Customer(customer_id)).await
    }

    /// Orders in one status, newest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        self.list_where(OrderFilter::Status(status)).await
    }

    pub async fn list_where(&self, filter: OrderFilter) -> DbResult<Vec<Order>> {
        let mut tx = self.pool.begin().await?;
        let orders = fetch_orders(&mut tx, filter).await?;
        tx.commit().await?;
        Ok(orders)
    }

    pub async fn count(&self) -> DbResult<i64> {
        count_orders(&self.pool).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
