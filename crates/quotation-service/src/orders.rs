//! # Order Aggregate Service
//!
//! Create, update, status change, read and delete of orders, each as one
//! atomic unit of work.
//!
//! ## Create Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate request (no I/O)                                             │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  1. next_order_sequence(today)   ← first statement, takes write lock   │
//! │  2. resolve customer, employee, items (fail fast)                      │
//! │  3. build line snapshots, compute totals                               │
//! │  4. insert header ── order number taken? ── draw next value, retry     │
//! │  5. insert lines                                                        │
//! │  6. read the aggregate back                                             │
//! │       │                                                                 │
//! │  COMMIT  (any error above drops the transaction: nothing persists)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Update and status changes start with `touch_order`, which takes the
//! write lock and tells whether the order exists before anything is read.

use sqlx::{Sqlite, Transaction};
use tracing::{debug, info, warn};

use quotation_core::line::build_lines;
use quotation_core::order_number::date_key;
use quotation_core::validation::{validate_notes, validate_order_request};
use quotation_core::{
    ActorRef, EntityId, EntityKind, Order, OrderNumber, OrderRequest, OrderStatus, OrderTotals,
    StatusUpdateRequest, TaxRate,
};
use quotation_db::repository::now;
use quotation_db::repository::order::{
    delete_order, fetch_order, insert_order_header, insert_order_lines, replace_order_lines,
    set_order_status, touch_order, update_order_header,
};
use quotation_db::repository::sequence::next_order_sequence;
use quotation_db::{Database, DbError};

use crate::error::{ServiceError, ServiceResult};
use crate::resolver::resolve_references;

const ORDER_NUMBER_COLUMN: &str = "orders.order_number";

/// Tunables of the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSettings {
    /// Rate stamped on new orders. Existing orders keep theirs.
    pub tax_rate: TaxRate,
    /// Order numbers a single create may try before failing with `Conflict`.
    pub max_number_attempts: u32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        OrderSettings {
            tax_rate: TaxRate::default(),
            max_number_attempts: 3,
        }
    }
}

/// The order aggregate service.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(db: Database, settings: OrderSettings) -> Self {
        OrderService { db, settings }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> OrderSettings {
        self.settings
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates an order for `actor`.
    ///
    /// The new order is PENDING, billed today (UTC) and numbered
    /// `ORD-<today>-<seq>`.
    pub async fn create_order(&self, request: &OrderRequest, actor: &ActorRef) -> ServiceResult<Order> {
        validate_order_request(request)?;

        let at = now();
        let today = at.date_naive();
        let key = date_key(today);

        let mut tx = self.db.begin().await?;

        let mut sequence = next_order_sequence(&mut *tx, &key).await?;

        let refs = resolve_references(&mut tx, request).await?;
        let items = build_lines(&request.items, &refs.items)?;
        let totals = OrderTotals::compute(&items, request.tax_enabled, self.settings.tax_rate)?;

        let mut order = Order {
            id: 0,
            order_number: OrderNumber::new(today, sequence)?.to_string(),
            customer_id: refs.customer.id,
            customer_name: refs.customer.name,
            employee_id: refs.employee.as_ref().map(|e| e.id),
            employee_name: refs.employee.map(|e| e.name),
            items,
            subtotal: totals.subtotal,
            tax_enabled: request.tax_enabled,
            tax_rate: self.settings.tax_rate,
            tax_amount: totals.tax_amount,
            total: totals.total,
            status: OrderStatus::Pending,
            billing_date: today,
            notes: request.notes.clone(),
            created_by: actor.clone(),
            created_at: at,
            updated_at: at,
        };

        let mut attempt = 1;
        let id = loop {
            match insert_order_header(&mut *tx, &order).await {
                Ok(id) => break id,
                Err(e) if e.is_unique_violation_on(ORDER_NUMBER_COLUMN) => {
                    warn!(
                        order_number = %order.order_number,
                        attempt,
                        "Order number already taken"
                    );
                    if attempt >= self.settings.max_number_attempts {
                        return Err(ServiceError::Conflict {
                            order_number: order.order_number,
                            attempts: attempt,
                        });
                    }
                    attempt += 1;
                    sequence = next_order_sequence(&mut *tx, &key).await?;
                    order.order_number = OrderNumber::new(today, sequence)?.to_string();
                }
                Err(e) => return Err(e.into()),
            }
        };

        insert_order_lines(&mut tx, id, &order.items).await?;
        let created = load_written(&mut tx, id).await?;
        commit(tx).await?;

        info!(
            order_id = created.id,
            order_number = %created.order_number,
            customer_id = created.customer_id,
            lines = created.line_count(),
            total = %created.total,
            "Order created"
        );
        Ok(created)
    }

    /// Replaces customer, employee, lines, tax flag and notes of an order
    /// and recomputes its totals.
    ///
    /// Id, order number, tax rate, status, billing date, creator and
    /// creation time stay as stored.
    pub async fn update_order(&self, id: EntityId, request: &OrderRequest) -> ServiceResult<Order> {
        validate_order_request(request)?;

        let at = now();
        let mut tx = self.db.begin().await?;

        if !touch_order(&mut *tx, id, at).await? {
            return Err(ServiceError::not_found(EntityKind::Order, id));
        }
        let existing = load_written(&mut tx, id).await?;

        let refs = resolve_references(&mut tx, request).await?;
        let items = build_lines(&request.items, &refs.items)?;
        let totals = OrderTotals::compute(&items, request.tax_enabled, existing.tax_rate)?;

        let updated = Order {
            customer_id: refs.customer.id,
            customer_name: refs.customer.name,
            employee_id: refs.employee.as_ref().map(|e| e.id),
            employee_name: refs.employee.map(|e| e.name),
            items,
            subtotal: totals.subtotal,
            tax_enabled: request.tax_enabled,
            tax_amount: totals.tax_amount,
            total: totals.total,
            notes: request.notes.clone(),
            updated_at: at,
            ..existing
        };

        update_order_header(&mut *tx, &updated).await?;
        replace_order_lines(&mut tx, id, &updated.items).await?;
        let stored = load_written(&mut tx, id).await?;
        commit(tx).await?;

        info!(
            order_id = id,
            order_number = %stored.order_number,
            lines = stored.line_count(),
            total = %stored.total,
            "Order updated"
        );
        Ok(stored)
    }

    /// Assigns a new status. Any status may follow any other.
    ///
    /// Supplied notes replace the stored notes; absent notes leave them.
    pub async fn update_status(&self, id: EntityId, request: &StatusUpdateRequest) -> ServiceResult<Order> {
        validate_notes(request.notes.as_deref())?;

        let at = now();
        let mut tx = self.db.begin().await?;

        if !touch_order(&mut *tx, id, at).await? {
            return Err(ServiceError::not_found(EntityKind::Order, id));
        }
        let existing = load_written(&mut tx, id).await?;
        let next = request.status;

        set_order_status(&mut *tx, id, next, request.notes.as_deref(), at).await?;
        let stored = load_written(&mut tx, id).await?;
        commit(tx).await?;

        info!(order_id = id, from = %existing.status, to = %next, "Order status changed");
        Ok(stored)
    }

    /// Deletes an order and its lines.
    pub async fn delete_order(&self, id: EntityId) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;

        if !delete_order(&mut *tx, id).await? {
            return Err(ServiceError::not_found(EntityKind::Order, id));
        }
        commit(tx).await?;

        info!(order_id = id, "Order deleted");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order with its lines.
    pub async fn get_order(&self, id: EntityId) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Order, id))
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        let orders = self.db.orders().list().await?;
        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Orders of one customer, newest first. Unknown customers have none.
    pub async fn list_orders_for_customer(&self, customer_id: EntityId) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_for_customer(customer_id).await?)
    }

    /// Orders in one status, newest first.
    pub async fn list_orders_by_status(&self, status: OrderStatus) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_by_status(status).await?)
    }

    /// Number of stored orders.
    pub async fn count_orders(&self) -> ServiceResult<i64> {
        Ok(self.db.orders().count().await?)
    }
}

/// Reads back an order this transaction has just locked or written.
async fn load_written(tx: &mut Transaction<'static, Sqlite>, id: EntityId) -> ServiceResult<Order> {
    fetch_order(tx, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Order, id))
}

async fn commit(tx: Transaction<'static, Sqlite>) -> ServiceResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use quotation_core::{
        CoreError, Money, NewCustomer, NewEmployee, NewItem, OrderLineRequest, ValidationError,
    };
    use quotation_db::repository::sequence::current_order_sequence;
    use quotation_db::DbConfig;
    use std::collections::HashSet;

    struct Fixture {
        service: OrderService,
        customer: EntityId,
        other_customer: EntityId,
        employee: EntityId,
        item_a: EntityId,
        item_b: EntityId,
        item_c: EntityId,
    }

    async fn seed(db: Database, settings: OrderSettings) -> Fixture {
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Sharma Traders".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;
        let other_customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Patel & Sons".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;
        let employee = db
            .employees()
            .insert(&NewEmployee {
                name: "Ravi".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;

        let item = |name: &'static str, unit: &'static str, cents: i64| {
            let db = db.clone();
            async move {
                db.catalog()
                    .insert_item(&NewItem {
                        name: name.into(),
                        unit: Some(unit.into()),
                        price: Money::from_cents(cents),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
                    .id
            }
        };
        let item_a = item("Cement 50kg", "bag", 4800).await;
        let item_b = item("River sand", "ton", 2500).await;
        let item_c = item("Red brick", "pcs", 900).await;

        Fixture {
            service: OrderService::new(db, settings),
            customer,
            other_customer,
            employee,
            item_a,
            item_b,
            item_c,
        }
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(db, OrderSettings::default()).await
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn actor() -> ActorRef {
        ActorRef::new("sales@example.com")
    }

    fn three_lines(f: &Fixture) -> OrderRequest {
        OrderRequest {
            customer_id: f.customer,
            employee_id: None,
            items: vec![
                OrderLineRequest::new(f.item_a, 2, money("50.00")),
                OrderLineRequest::new(f.item_b, 1, money("30.00")),
                OrderLineRequest::new(f.item_c, 5, money("10.00")),
            ],
            tax_enabled: false,
            notes: None,
        }
    }

    fn one_line(f: &Fixture, price: &str, tax_enabled: bool) -> OrderRequest {
        OrderRequest {
            customer_id: f.customer,
            employee_id: None,
            items: vec![OrderLineRequest::new(f.item_a, 1, money(price))],
            tax_enabled,
            notes: None,
        }
    }

    fn today_number(sequence: i64) -> String {
        OrderNumber::new(Utc::now().date_naive(), sequence)
            .unwrap()
            .to_string()
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_three_line_order_totals() {
        let f = fixture().await;

        let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        assert_eq!(order.subtotal, money("180.00"));
        assert_eq!(order.tax_amount, Money::zero());
        assert_eq!(order.total, money("180.00"));
        let totals: Vec<_> = order.items.iter().map(|l| l.total.to_string()).collect();
        assert_eq!(totals, ["100.00", "30.00", "50.00"]);
    }

    #[tokio::test]
    async fn test_tax_enabled_and_disabled() {
        let f = fixture().await;

        let taxed = f
            .service
            .create_order(&one_line(&f, "1000.00", true), &actor())
            .await
            .unwrap();
        assert_eq!(taxed.tax_amount, money("180.00"));
        assert_eq!(taxed.total, money("1180.00"));
        assert_eq!(taxed.tax_rate.percent(), 18);

        let untaxed = f
            .service
            .create_order(&one_line(&f, "1000.00", false), &actor())
            .await
            .unwrap();
        assert_eq!(untaxed.tax_amount, money("0.00"));
        assert_eq!(untaxed.total, money("1000.00"));
    }

    #[tokio::test]
    async fn test_created_order_fields() {
        let f = fixture().await;
        let mut request = three_lines(&f);
        request.employee_id = Some(f.employee);
        request.notes = Some("deliver before noon".into());

        let order = f.service.create_order(&request, &actor()).await.unwrap();

        assert!(order.id > 0);
        assert_eq!(order.order_number, today_number(1));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.billing_date, order.created_at.date_naive());
        assert_eq!(order.created_by, actor());
        assert_eq!(order.created_at, order.updated_at);
        assert_eq!(order.customer_name, "Sharma Traders");
        assert_eq!(order.employee_name.as_deref(), Some("Ravi"));
        assert_eq!(order.notes.as_deref(), Some("deliver before noon"));

        let snapshot: Vec<_> = order
            .items
            .iter()
            .map(|l| (l.item_name.as_str(), l.unit.as_deref(), l.quantity))
            .collect();
        assert_eq!(
            snapshot,
            [
                ("Cement 50kg", Some("bag"), 2),
                ("River sand", Some("ton"), 1),
                ("Red brick", Some("pcs"), 5),
            ]
        );

        assert_eq!(f.service.get_order(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_quoted_price_overrides_catalog() {
        let f = fixture().await;

        let order = f
            .service
            .create_order(&one_line(&f, "12.34", false), &actor())
            .await
            .unwrap();

        assert_eq!(order.items[0].price, money("12.34"));
        assert_eq!(order.subtotal, money("12.34"));
    }

    #[tokio::test]
    async fn test_numbers_increase_within_a_day() {
        let f = fixture().await;

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
            numbers.push(order.order_number);
        }

        assert_eq!(numbers, [today_number(1), today_number(2), today_number(3)]);
    }

    #[tokio::test]
    async fn test_number_not_reused_after_delete() {
        let f = fixture().await;

        let first = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
        f.service.delete_order(first.id).await.unwrap();
        let second = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        assert_ne!(first.order_number, second.order_number);
        assert_eq!(second.order_number, today_number(2));
    }

    #[tokio::test]
    async fn test_missing_customer_persists_nothing() {
        let f = fixture().await;
        let mut request = three_lines(&f);
        request.customer_id = 999;

        let err = f.service.create_order(&request, &actor()).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::NotFound { entity: EntityKind::Customer, id: 999 }
        ));
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(f.service.list_orders().await.unwrap().is_empty());
        assert_eq!(f.service.count_orders().await.unwrap(), 0);

        let key = date_key(Utc::now().date_naive());
        assert_eq!(
            current_order_sequence(f.service.database().pool(), &key).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_missing_employee_or_item_aborts() {
        let f = fixture().await;

        let mut request = three_lines(&f);
        request.employee_id = Some(31);
        let err = f.service.create_order(&request, &actor()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Employee, id: 31 }));

        let mut request = three_lines(&f);
        request.items.push(OrderLineRequest::new(4040, 1, money("1.00")));
        let err = f.service.create_order(&request, &actor()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Item, id: 4040 }));

        assert_eq!(f.service.count_orders().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_lines_are_rejected() {
        let f = fixture().await;

        let mut empty = three_lines(&f);
        empty.items.clear();
        let err = f.service.create_order(&empty, &actor()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(err.code().http_status(), 400);

        for (quantity, price) in [(0, "10.00"), (-2, "10.00"), (1, "0.00"), (1, "-5.00")] {
            let mut request = three_lines(&f);
            request.items[1] = OrderLineRequest::new(f.item_b, quantity, money(price));
            let err = f.service.create_order(&request, &actor()).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{quantity} x {price}");
        }

        assert_eq!(f.service.count_orders().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overflowing_amounts_are_rejected() {
        let f = fixture().await;
        let mut request = three_lines(&f);
        request.items = vec![
            OrderLineRequest::new(f.item_a, 1, Money::from_cents(i64::MAX - 10)),
            OrderLineRequest::new(f.item_b, 1, Money::from_cents(100)),
        ];

        let err = f.service.create_order(&request, &actor()).await.unwrap_err();

        assert!(matches!(err, ServiceError::Core(CoreError::AmountOverflow { .. })));
        assert_eq!(err.code().http_status(), 422);
        assert_eq!(f.service.count_orders().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bulk_quantities_are_accepted() {
        let f = fixture().await;
        let mut request = three_lines(&f);
        request.items = vec![OrderLineRequest::new(f.item_a, 100_000, money("9.00"))];

        let order = f.service.create_order(&request, &actor()).await.unwrap();

        assert_eq!(order.items[0].quantity, 100_000);
        assert_eq!(order.items[0].total, money("900000.00"));
        assert_eq!(order.subtotal, money("900000.00"));
        assert_eq!(f.service.get_order(order.id).await.unwrap(), order);
    }

    // -------------------------------------------------------------------------
    // Order numbers under contention
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_taken_number_is_skipped() {
        let f = fixture().await;
        let squatter = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        // A row carrying the number the counter will hand out next.
        let mut forged = squatter.clone();
        forged.order_number = today_number(2);
        insert_order_header(f.service.database().pool(), &forged).await.unwrap();

        let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
        assert_eq!(order.order_number, today_number(3));
    }

    #[tokio::test]
    async fn test_conflict_after_last_attempt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let f = seed(
            db,
            OrderSettings {
                max_number_attempts: 2,
                ..OrderSettings::default()
            },
        )
        .await;
        let first = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        for sequence in [2, 3] {
            let mut forged = first.clone();
            forged.order_number = today_number(sequence);
            insert_order_header(f.service.database().pool(), &forged).await.unwrap();
        }

        let err = f.service.create_order(&three_lines(&f), &actor()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict { ref order_number, attempts: 2 } if *order_number == today_number(3)
        ));
        assert_eq!(err.code().http_status(), 409);
        assert_eq!(f.service.count_orders().await.unwrap(), 3);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_order_futures_are_send() {
        let f = fixture().await;
        let request = three_lines(&f);
        let actor = actor();

        assert_send(&f.service.create_order(&request, &actor));
        assert_send(&f.service.update_order(1, &request));
        assert_send(&f.service.update_status(1, &status(OrderStatus::Confirmed, None)));
        assert_send(&f.service.delete_order(1));
        assert_send(&f.service.get_order(1));
        assert_send(&f.service.list_orders());
    }

    #[tokio::test]
    async fn test_order_operations_run_on_spawned_tasks() {
        let f = fixture().await;
        let request = three_lines(&f);

        let service = f.service.clone();
        let create = request.clone();
        let created = tokio::spawn(async move { service.create_order(&create, &actor()).await })
            .await
            .unwrap()
            .unwrap();

        let service = f.service.clone();
        let mut update = request.clone();
        update.tax_enabled = true;
        let updated = tokio::spawn(async move { service.update_order(created.id, &update).await })
            .await
            .unwrap()
            .unwrap();
        assert!(updated.tax_enabled);

        let service = f.service.clone();
        let confirmed = tokio::spawn(async move {
            service
                .update_status(created.id, &status(OrderStatus::Confirmed, None))
                .await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let service = f.service.clone();
        tokio::spawn(async move { service.delete_order(created.id).await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(f.service.count_orders().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let path = std::env::temp_dir().join(format!(
            "quotation-orders-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();
        let f = seed(db, OrderSettings::default()).await;
        let request = three_lines(&f);

        let handles: Vec<_> = (0..24)
            .map(|_| {
                let service = f.service.clone();
                let request = request.clone();
                tokio::spawn(async move { service.create_order(&request, &actor()).await })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            let order = handle.await.unwrap().unwrap();
            assert!(numbers.insert(order.order_number), "duplicate order number");
        }

        let expected: HashSet<_> = (1..=24).map(today_number).collect();
        assert_eq!(numbers, expected);
        assert_eq!(f.service.count_orders().await.unwrap(), 24);

        f.service.database().close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_replaces_lines_and_keeps_identity() {
        let f = fixture().await;
        let created = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        let request = OrderRequest {
            customer_id: f.other_customer,
            employee_id: Some(f.employee),
            items: vec![OrderLineRequest::new(f.item_c, 10, money("9.50"))],
            tax_enabled: true,
            notes: Some("revised".into()),
        };
        let updated = f.service.update_order(created.id, &request).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.order_number, created.order_number);
        assert_eq!(updated.created_by, created.created_by);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.billing_date, created.billing_date);
        assert!(updated.updated_at >= created.updated_at);

        assert_eq!(updated.customer_name, "Patel & Sons");
        assert_eq!(updated.employee_name.as_deref(), Some("Ravi"));
        assert_eq!(updated.line_count(), 1);
        assert_eq!(updated.subtotal, money("95.00"));
        assert_eq!(updated.tax_amount, money("17.10"));
        assert_eq!(updated.total, money("112.10"));
        assert_eq!(updated.notes.as_deref(), Some("revised"));

        assert_eq!(f.service.get_order(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_keeps_stamped_tax_rate() {
        let f = fixture().await;
        let created = f
            .service
            .create_order(&one_line(&f, "1000.00", true), &actor())
            .await
            .unwrap();

        let repriced = OrderService::new(
            f.service.database().clone(),
            OrderSettings {
                tax_rate: TaxRate::from_percent(5),
                ..OrderSettings::default()
            },
        );
        let updated = repriced
            .update_order(created.id, &one_line(&f, "1000.00", true))
            .await
            .unwrap();

        assert_eq!(updated.tax_rate.percent(), 18);
        assert_eq!(updated.tax_amount, money("180.00"));
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let f = fixture().await;

        let err = f.service.update_order(77, &three_lines(&f)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Order, id: 77 }));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_order_untouched() {
        let f = fixture().await;
        let created = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        let mut request = one_line(&f, "5.00", false);
        request.items.push(OrderLineRequest::new(8080, 1, money("1.00")));
        let err = f.service.update_order(created.id, &request).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Item, id: 8080 }));
        assert_eq!(f.service.get_order(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_lines_keep_snapshot_until_updated() {
        let f = fixture().await;
        let created = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        f.service
            .database()
            .catalog()
            .rename_item(f.item_a, "Cement 50kg (OPC)")
            .await
            .unwrap();

        let read = f.service.get_order(created.id).await.unwrap();
        assert_eq!(read.items[0].item_name, "Cement 50kg");

        let updated = f.service.update_order(created.id, &three_lines(&f)).await.unwrap();
        assert_eq!(updated.items[0].item_name, "Cement 50kg (OPC)");
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    fn status(status: OrderStatus, notes: Option<&str>) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status,
            notes: notes.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_status_change_keeps_totals_and_notes() {
        let f = fixture().await;
        let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        let confirmed = f
            .service
            .update_status(order.id, &status(OrderStatus::Confirmed, Some("PO received")))
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.notes.as_deref(), Some("PO received"));
        assert_eq!(confirmed.total, order.total);
        assert_eq!(confirmed.order_number, order.order_number);

        let again = f
            .service
            .update_status(order.id, &status(OrderStatus::Confirmed, None))
            .await
            .unwrap();
        assert_eq!(again.status, OrderStatus::Confirmed);
        assert_eq!(again.notes.as_deref(), Some("PO received"));
    }

    #[tokio::test]
    async fn test_any_status_may_follow_any_other() {
        let f = fixture().await;
        let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        // Skipping ahead, reopening and moving backwards are all accepted.
        let path = [
            OrderStatus::Completed,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            OrderStatus::Confirmed,
            OrderStatus::Draft,
        ];
        for next in path {
            let changed = f
                .service
                .update_status(order.id, &status(next, None))
                .await
                .unwrap();
            assert_eq!(changed.status, next);
            assert_eq!(f.service.get_order(order.id).await.unwrap().status, next);
        }
    }

    #[tokio::test]
    async fn test_cancel_and_filter_by_status() {
        let f = fixture().await;
        let kept = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
        let dropped = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        f.service
            .update_status(dropped.id, &status(OrderStatus::Cancelled, None))
            .await
            .unwrap();

        let cancelled = f.service.list_orders_by_status(OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.iter().map(|o| o.id).collect::<Vec<_>>(), [dropped.id]);
        let pending = f.service.list_orders_by_status(OrderStatus::Pending).await.unwrap();
        assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), [kept.id]);
    }

    #[tokio::test]
    async fn test_status_of_missing_order() {
        let f = fixture().await;

        let err = f
            .service
            .update_status(5, &status(OrderStatus::Confirmed, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Order, id: 5 }));
    }

    // -------------------------------------------------------------------------
    // Reads and delete
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_is_repeatable() {
        let f = fixture().await;
        let order = f
            .service
            .create_order(&one_line(&f, "333.33", true), &actor())
            .await
            .unwrap();

        let first = f.service.get_order(order.id).await.unwrap();
        let second = f.service.get_order(order.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.tax_amount, money("60.00"));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_by_customer() {
        let f = fixture().await;
        let a = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();
        let mut other = three_lines(&f);
        other.customer_id = f.other_customer;
        let b = f.service.create_order(&other, &actor()).await.unwrap();
        let c = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        let all: Vec<_> = f.service.list_orders().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(all, [c.id, b.id, a.id]);

        let listed = f.service.list_orders_for_customer(f.customer).await.unwrap();
        assert_eq!(listed.iter().map(|o| o.id).collect::<Vec<_>>(), [c.id, a.id]);
        assert!(listed.iter().all(|o| o.line_count() == 3));

        assert!(f.service.list_orders_for_customer(12345).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let f = fixture().await;
        let order = f.service.create_order(&three_lines(&f), &actor()).await.unwrap();

        f.service.delete_order(order.id).await.unwrap();

        let err = f.service.get_order(order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Order, .. }));
        let err = f.service.delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Order, .. }));
        assert_eq!(f.service.count_orders().await.unwrap(), 0);
    }
}
