//! # quotation-core: Pure Order Logic for the Quotation System
//!
//! This crate is the **heart** of the quotation/order workflow. It contains
//! the order calculations as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Quotation Orders Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP layer (external collaborator)              │   │
//! │  │     POST /orders ──► PUT /orders/{id} ──► GET /orders          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              quotation-service (OrderService)                   │   │
//! │  │     resolve refs ─► build lines ─► totals ─► number ─► save     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quotation-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  line   │ │  totals  │ │ status │  │   │
//! │  │   │  Order  │ │  Money  │ │ builder │ │ subtotal │ │ values │  │   │
//! │  │   │ Request │ │ TaxRate │ │snapshot │ │ tax/total│ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderLine, Customer, Item, requests)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`line`] - Order line snapshots
//! - [`totals`] - Subtotal, tax and grand total
//! - [`order_number`] - `ORD-YYYYMMDD-NNNN` identifiers
//! - [`status`] - Order status values
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use quotation_core::money::Money;
//! use quotation_core::types::TaxRate;
//!
//! let subtotal: Money = "1000.00".parse().unwrap();
//! let tax = subtotal.calculate_tax(TaxRate::from_percent(18)).unwrap();
//!
//! assert_eq!(tax.to_string(), "180.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod line;
pub mod money;
pub mod order_number;
pub mod status;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order_number::OrderNumber;
pub use status::OrderStatus;
pub use totals::OrderTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate applied to new orders when none is configured (GST 18%).
pub const DEFAULT_TAX_RATE_PERCENT: u32 = 18;

/// Maximum length of order notes (matches the storage column).
pub const MAX_NOTES_LEN: usize = 1000;
