//! # Order Line Builder
//!
//! Turns a requested line plus the resolved catalog item into an immutable
//! [`OrderLine`] snapshot.
//!
//! ```text
//! OrderLineRequest { item_id: 3, quantity: 2, price: 50.00 }
//!        +
//! Item { id: 3, name: "Cement 50kg", unit: "bag", current_price: 48.00 }
//!        │
//!        ▼
//! OrderLine { item_name: "Cement 50kg", unit: "bag",
//!             quantity: 2, price: 50.00, total: 100.00 }
//! ```
//!
//! The quoted price wins over `current_price`: quotations may override the
//! catalog.

use crate::error::{CoreError, CoreResult};
use crate::types::{Item, OrderLine, OrderLineRequest};
use crate::validation::validate_line;

impl OrderLine {
    /// Builds the snapshot for one requested line.
    ///
    /// ## Errors
    /// - `Validation` if quantity or price is not positive (never coerced)
    /// - `AmountOverflow` if `price × quantity` does not fit
    pub fn snapshot(request: &OrderLineRequest, item: &Item) -> CoreResult<OrderLine> {
        validate_line(request)?;

        let total = request
            .price
            .checked_multiply_quantity(request.quantity)
            .ok_or_else(|| CoreError::overflow(format!("line total for item {}", item.id)))?;

        Ok(OrderLine {
            item_id: item.id,
            item_name: item.name.clone(),
            quantity: request.quantity,
            price: request.price,
            unit: item.unit.clone(),
            total,
        })
    }
}

/// Builds snapshots for every requested line, in request order.
///
/// `items` must be the resolved item for each request, index for index.
pub fn build_lines(requests: &[OrderLineRequest], items: &[Item]) -> CoreResult<Vec<OrderLine>> {
    requests
        .iter()
        .zip(items)
        .map(|(request, item)| OrderLine::snapshot(request, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;

    fn item(id: i64, name: &str, unit: &str, cents: i64) -> Item {
        let now = Utc::now();
        Item {
            id,
            name: name.to_string(),
            unit: Some(unit.to_string()),
            current_price: Money::from_cents(cents),
            category_id: None,
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_snapshot_copies_item_fields_and_keeps_quoted_price() {
        let cement = item(3, "Cement 50kg", "bag", 4800);
        let request = OrderLineRequest::new(3, 2, Money::from_cents(5000));

        let line = OrderLine::snapshot(&request, &cement).unwrap();

        assert_eq!(line.item_id, 3);
        assert_eq!(line.item_name, "Cement 50kg");
        assert_eq!(line.unit.as_deref(), Some("bag"));
        assert_eq!(line.price, Money::from_cents(5000));
        assert_eq!(line.total, Money::from_cents(10_000));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_catalog_edits() {
        let mut cement = item(3, "Cement 50kg", "bag", 4800);
        let line = OrderLine::snapshot(&OrderLineRequest::new(3, 1, Money::from_cents(5000)), &cement)
            .unwrap();

        cement.name = "Cement 50kg (new mix)".to_string();
        cement.unit = Some("sack".to_string());

        assert_eq!(line.item_name, "Cement 50kg");
        assert_eq!(line.unit.as_deref(), Some("bag"));
    }

    #[test]
    fn test_snapshot_rejects_non_positive_values() {
        let cement = item(3, "Cement 50kg", "bag", 4800);

        let zero_qty = OrderLineRequest::new(3, 0, Money::from_cents(5000));
        assert!(matches!(
            OrderLine::snapshot(&zero_qty, &cement),
            Err(CoreError::Validation(_))
        ));

        let negative_price = OrderLineRequest::new(3, 1, Money::from_cents(-1));
        assert!(matches!(
            OrderLine::snapshot(&negative_price, &cement),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_snapshot_reports_overflow() {
        let cement = item(3, "Cement 50kg", "bag", 4800);
        let request = OrderLineRequest::new(3, 99_999, Money::from_cents(i64::MAX / 2));

        assert!(matches!(
            OrderLine::snapshot(&request, &cement),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_build_lines_preserves_request_order() {
        let items = vec![item(1, "A", "pc", 100), item(2, "B", "pc", 100)];
        let requests = vec![
            OrderLineRequest::new(1, 2, Money::from_cents(5000)),
            OrderLineRequest::new(2, 1, Money::from_cents(3000)),
        ];

        let lines = build_lines(&requests, &items).unwrap();

        let names: Vec<_> = lines.iter().map(|l| l.item_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }
}
