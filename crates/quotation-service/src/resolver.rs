//! # Reference Resolver
//!
//! Turns the ids on an order request into the customer, employee and items
//! they refer to, or fails with `NotFound` for the first one that is missing.
//!
//! ```text
//! OrderRequest { customer_id: 7, employee_id: None, items: [3, 1, 3] }
//!        │
//!        ├── customer 7 ............. found
//!        ├── employee ............... none requested
//!        ├── item 3 ................. found
//!        ├── item 1 ................. missing ──► NotFound(Item, 1), stop
//!        └── item 3 ................. never looked at
//! ```
//!
//! Lookups run on the caller's connection, so inside an order transaction
//! they see the same state the write will be checked against. Nothing is
//! written.

use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

use quotation_core::{Customer, Employee, EntityId, EntityKind, Item, OrderRequest};
use quotation_db::repository::catalog::fetch_item;
use quotation_db::repository::customer::fetch_customer;
use quotation_db::repository::employee::fetch_employee;

use crate::error::{ServiceError, ServiceResult};

/// Everything an order request points at.
#[derive(Debug, Clone)]
pub struct ResolvedReferences {
    pub customer: Customer,
    pub employee: Option<Employee>,
    /// One entry per requested line, index for index.
    pub items: Vec<Item>,
}

/// Resolves a customer id.
pub async fn resolve_customer(conn: &mut SqliteConnection, id: EntityId) -> ServiceResult<Customer> {
    fetch_customer(&mut *conn, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Customer, id))
}

/// Resolves an optional employee id. `None` resolves to no employee.
pub async fn resolve_employee(
    conn: &mut SqliteConnection,
    id: Option<EntityId>,
) -> ServiceResult<Option<Employee>> {
    let Some(id) = id else {
        return Ok(None);
    };

    fetch_employee(&mut *conn, id)
        .await?
        .map(Some)
        .ok_or_else(|| ServiceError::not_found(EntityKind::Employee, id))
}

/// Resolves item ids in order. An id listed twice is looked up once.
pub async fn resolve_items(
    conn: &mut SqliteConnection,
    ids: &[EntityId],
) -> ServiceResult<Vec<Item>> {
    let mut seen: HashMap<EntityId, Item> = HashMap::new();
    let mut items = Vec::with_capacity(ids.len());

    for &id in ids {
        if let Some(item) = seen.get(&id) {
            items.push(item.clone());
            continue;
        }

        let item = fetch_item(&mut *conn, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Item, id))?;
        seen.insert(id, item.clone());
        items.push(item);
    }

    Ok(items)
}

/// Resolves every reference of `request`: customer, then employee, then
/// each line's item in request order.
pub async fn resolve_references(
    conn: &mut SqliteConnection,
    request: &OrderRequest,
) -> ServiceResult<ResolvedReferences> {
    let customer = resolve_customer(conn, request.customer_id).await?;
    let employee = resolve_employee(conn, request.employee_id).await?;
    let item_ids: Vec<EntityId> = request.items.iter().map(|line| line.item_id).collect();
    let items = resolve_items(conn, &item_ids).await?;

    debug!(
        customer_id = customer.id,
        employee_id = ?employee.as_ref().map(|e| e.id),
        lines = items.len(),
        "Resolved order references"
    );

    Ok(ResolvedReferences {
        customer,
        employee,
        items,
    })
}
