//! # quotation-db: Database Layer for the Quotation System
//!
//! This crate provides database access for the quotation/order workflow.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quotation Data Flow                              │
//! │                                                                         │
//! │  OrderService::create_order                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   quotation-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ EmployeeRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ CatalogRepo    │    │              │  │   │
//! │  │   │               │    │ OrderRepo      │    │              │  │   │
//! │  │   │               │    │ sequence       │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Executor-generic functions
//! Every repository module exposes free functions taking a sqlx executor
//! (`&SqlitePool` or `&mut SqliteConnection`) next to the pool-backed
//! repository struct. The service layer calls the free functions with its
//! open transaction so that an order aggregate is read and written as one
//! unit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quotation_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("quotation.db")).await?;
//! let order = db.orders().get_by_id(42).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::order::{OrderFilter, OrderRepository};
