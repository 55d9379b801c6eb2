//! # Domain Types
//!
//! Core domain types used throughout the quotation system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderLine     │   │     Item        │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  item_id        │──►│  id (i64)       │       │
//! │  │  order_number   │   │  item_name (❄)  │   │  name           │       │
//! │  │  customer_name❄ │   │  unit (❄)       │   │  unit           │       │
//! │  │  subtotal/tax   │   │  price × qty    │   │  price (unused) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = snapshot copied at create/update time, never re-joined on read    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! An order has:
//! - `id`: storage-assigned integer - immutable, used for relations
//! - `order_number`: `ORD-YYYYMMDD-NNNN` - human-readable, assigned once

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::status::OrderStatus;
use crate::DEFAULT_TAX_RATE_PERCENT;

/// Storage-assigned identifier shared by every entity.
pub type EntityId = i64;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate as a whole percentage (18 = 18% GST).
///
/// Fixed on the order at creation; a later change of the configured rate
/// never reprices existing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from a whole percentage.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        TaxRate(percent)
    }

    /// Returns the rate as a whole percentage.
    #[inline]
    pub const fn percent(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(DEFAULT_TAX_RATE_PERCENT)
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The identity performing an operation, supplied by the caller's
/// authentication layer (e.g. the login email).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActorRef(String);

impl ActorRef {
    pub fn new(id: impl Into<String>) -> Self {
        ActorRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kinds of entity an id can refer to, used in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EntityKind {
    Customer,
    Employee,
    Category,
    Item,
    Order,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Customer => "Customer",
            EntityKind::Employee => "Employee",
            EntityKind::Category => "Category",
            EntityKind::Item => "Item",
            EntityKind::Order => "Order",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// A customer an order is quoted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub phone: Option<String>,
    /// GST registration number.
    pub gst: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for registering a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub gst: Option<String>,
    pub address: Option<String>,
}

/// A salesperson who can be attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: EntityId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for registering an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
}

/// A catalog category grouping items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for adding a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// A catalog item that can be quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub unit: Option<String>,
    /// Current catalog price. Orders use the caller's quoted price instead.
    pub current_price: Money,
    pub category_id: Option<EntityId>,
    pub description: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for adding a catalog item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub unit: Option<String>,
    pub price: Money,
    pub category_id: Option<EntityId>,
    pub description: Option<String>,
}

// =============================================================================
// Requests
// =============================================================================

/// One requested line: which item, how many, at what quoted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineRequest {
    pub item_id: EntityId,
    pub quantity: i64,
    pub price: Money,
}

impl OrderLineRequest {
    pub fn new(item_id: EntityId, quantity: i64, price: Money) -> Self {
        OrderLineRequest {
            item_id,
            quantity,
            price,
        }
    }
}

/// Payload for creating or replacing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    pub customer_id: EntityId,
    pub employee_id: Option<EntityId>,
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub tax_enabled: bool,
    pub notes: Option<String>,
}

/// Payload for moving an order to another status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

// =============================================================================
// Order Aggregate
// =============================================================================

/// A line of an order.
///
/// Uses the snapshot pattern: `item_name` and `unit` are frozen copies of
/// the catalog item at the time the order was created or last replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub item_id: EntityId,
    pub item_name: String,
    pub quantity: i64,
    /// Quoted unit price (authoritative, may differ from the catalog).
    pub price: Money,
    pub unit: Option<String>,
    /// `price × quantity`.
    pub total: Money,
}

/// The order aggregate root.
///
/// Invariants after every create/update:
/// - `subtotal == Σ items[i].total`
/// - `total == subtotal + tax_amount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: EntityId,
    pub order_number: String,
    pub customer_id: EntityId,
    pub customer_name: String,
    pub employee_id: Option<EntityId>,
    pub employee_name: Option<String>,
    pub items: Vec<OrderLine>,
    pub subtotal: Money,
    pub tax_enabled: bool,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub billing_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: ActorRef,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Number of lines on the order.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
