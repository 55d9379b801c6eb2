//! # Repository Module
//!
//! Database repository implementations for the quotation system.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two ways into the same SQL                           │
//! │                                                                         │
//! │  OrderService (inside one transaction)     Callers outside a write      │
//! │       │                                          │                      │
//! │       │  order::insert_order(&mut *tx, ..)       │  db.orders().list()  │
//! │       ▼                                          ▼                      │
//! │  free functions, generic over             OrderRepository { pool }     │
//! │  E: SqliteExecutor<'e>           ◄────────  (delegates, opens its own   │
//! │       │                                      read transaction)          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - customer insert/lookup
//! - [`EmployeeRepository`](employee::EmployeeRepository) - employee insert/lookup
//! - [`CatalogRepository`](catalog::CatalogRepository) - categories and items
//! - [`OrderRepository`](order::OrderRepository) - order aggregate persistence
//! - [`sequence`] - the atomic per-date order number counter

pub mod catalog;
pub mod customer;
pub mod employee;
pub mod order;
pub mod sequence;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::error::{DbError, DbResult};

/// Formats a timestamp the way every table stores it.
///
/// Fixed-width microsecond RFC 3339 in UTC, so `ORDER BY created_at`
/// sorts chronologically.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp column.
pub(crate) fn parse_timestamp(table: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DbError::corrupt(table, format!("bad timestamp '{raw}': {e}")))
}

/// The current time, truncated to the microseconds storage keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
