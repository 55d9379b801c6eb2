//! # Validation Module
//!
//! Input validation utilities for order requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (external)                                        │
//! │  ├── Required fields, positive numbers                                 │
//! │  └── 400 responses with field messages                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: OrderService (Rust)                                          │
//! │  └── THIS MODULE: re-asserts what would corrupt totals                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0), CHECK (price_cents > 0)                     │
//! │  └── UNIQUE (order_number)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quotation_core::validation::{validate_price, validate_quantity};
//! use quotation_core::Money;
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_price(Money::zero()).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{OrderLineRequest, OrderRequest};
use crate::MAX_NOTES_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates optional order notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity. Any positive count is accepted; the product
/// with the price is overflow-checked when the line is built.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

/// Validates a quoted unit price. Free lines are not allowed on quotations.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::must_be_positive("price"));
    }

    Ok(())
}

/// Validates a whole-percent tax rate (0% to 100%).
pub fn validate_tax_rate_percent(percent: u32) -> ValidationResult<()> {
    if percent > 100 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates one requested line.
pub fn validate_line(line: &OrderLineRequest) -> ValidationResult<()> {
    validate_quantity(line.quantity)?;
    validate_price(line.price)
}

/// Validates the line set of an order: at least one line, every line valid.
pub fn validate_lines(lines: &[OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    lines.iter().try_for_each(validate_line)
}

/// Validates a full create/update payload.
pub fn validate_order_request(request: &OrderRequest) -> ValidationResult<()> {
    validate_lines(&request.items)?;
    validate_notes(request.notes.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================
