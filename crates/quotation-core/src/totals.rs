//! # Totals Calculator
//!
//! Pure computation of an order's subtotal, tax and grand total.
//!
//! ```text
//! lines ──► Σ line.total (list order) ──► subtotal
//!                                            │
//!                     tax_enabled? ──────────┤
//!                                            ▼
//!                         tax = round_half_up(subtotal × rate / 100)
//!                                            │
//!                                            ▼
//!                              total = subtotal + tax
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderLine, TaxRate};

/// Computed monetary totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Computes totals for a line set.
    ///
    /// An empty line set yields all zeros; the service rejects empty orders
    /// before getting here.
    ///
    /// ## Example
    /// ```rust
    /// use quotation_core::{Money, OrderTotals, TaxRate};
    ///
    /// let totals = OrderTotals::compute(&[], true, TaxRate::from_percent(18)).unwrap();
    /// assert_eq!(totals.total, Money::zero());
    /// ```
    pub fn compute(lines: &[OrderLine], tax_enabled: bool, rate: TaxRate) -> CoreResult<Self> {
        let subtotal = lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.total)
                .ok_or_else(|| CoreError::overflow("order subtotal"))
        })?;

        let tax_amount = if tax_enabled {
            subtotal
                .calculate_tax(rate)
                .ok_or_else(|| CoreError::overflow("tax amount"))?
        } else {
            Money::zero()
        };

        let total = subtotal
            .checked_add(tax_amount)
            .ok_or_else(|| CoreError::overflow("order total"))?;

        Ok(OrderTotals {
            subtotal,
            tax_amount,
            total,
        })
    }
}
