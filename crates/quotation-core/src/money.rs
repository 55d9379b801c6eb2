//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A quotation of 3 × 0.10 must total exactly 0.30, and 18% GST on       │
//! │  1000.00 must be exactly 180.00.                                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                     │
//! │    "50.00" parses to 5000, 5000 × 2 = 10000, displayed "100.00"        │
//! │    Rounding happens in exactly one place: the tax amount               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quotation_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Or parse an exact decimal string from a request payload
//! let quoted: Money = "10.99".parse().unwrap();
//! assert_eq!(price, quoted);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit
/// (paise for INR, cents for USD), i.e. a decimal with scale 2.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  OrderLineRequest.price ──► OrderLine.price × quantity ─► line.total   │
/// │                                                                         │
/// │  Σ line.total ──► subtotal ──► tax (rounded once) ──► total            │
/// │                                                                         │
/// │  EVERY monetary value in an order flows through this type              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use quotation_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use quotation_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5000); // 50.00
    /// let line_total = unit_price.checked_multiply_quantity(2).unwrap();
    /// assert_eq!(line_total.cents(), 10000); // 100.00
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Calculates tax at a whole-percent rate, rounding half-up.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  HALF-UP ROUNDING (away from zero on .5)                            │
    /// │                                                                     │
    /// │  exact tax = cents × percent / 100   (in hundredths of a cent)     │
    /// │                                                                     │
    /// │    1000.00 × 18% = 180.0000  → 180.00                              │
    /// │       0.25 × 18% =   0.0450  →   0.05                              │
    /// │       0.24 × 18% =   0.0432  →   0.04                              │
    /// │                                                                     │
    /// │  Applied ONCE to the order subtotal, never per line, so there is   │
    /// │  no cumulative drift across lines.                                 │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math in i128: `(|amount| × percent + 50) / 100`, sign restored.
    /// Returns `None` only when the result does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use quotation_core::money::Money;
    /// use quotation_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(100_000); // 1000.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_percent(18)).unwrap();
    /// assert_eq!(tax.cents(), 18_000); // 180.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        let scaled = (self.0 as i128).abs() * rate.percent() as i128;
        let rounded = (scaled + 50) / 100;
        let signed = if self.0 < 0 { -rounded } else { rounded };
        i64::try_from(signed).ok().map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount as a plain decimal with two places ("1180.00").
///
/// ## Note
/// Currency symbols and digit grouping belong to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Parses an exact decimal amount such as `"50"`, `"50.5"` or `"-12.34"`.
///
/// More than two fractional digits is an error, not a rounding.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if digits.contains('.') && fraction.is_empty() {
            return Err(invalid("expected digits after the decimal point"));
        }
        if fraction.len() > 2 {
            return Err(invalid("at most 2 decimal places are allowed"));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits after the decimal point"));
        }

        let major: i64 = whole.parse().map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
