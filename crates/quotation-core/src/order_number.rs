//! # Order Numbers
//!
//! Human-readable, date-scoped order identifiers: `ORD-YYYYMMDD-NNNN`.
//!
//! ## Format
//! - `YYYYMMDD`: creation date
//! - `NNNN`: per-date sequence, zero-padded to 4 digits (widens past 9999)
//!
//! This module only formats and parses. Drawing the sequence value is a
//! storage concern: the db layer increments a per-date counter row inside
//! the transaction that inserts the order, so two concurrent creations can
//! never be handed the same value.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

const PREFIX: &str = "ORD";

/// A parsed order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderNumber {
    date: NaiveDate,
    sequence: i64,
}

impl OrderNumber {
    /// Creates an order number for the given date and sequence value.
    ///
    /// Sequence values start at 1.
    pub fn new(date: NaiveDate, sequence: i64) -> Result<Self, CoreError> {
        if sequence < 1 {
            return Err(CoreError::InvalidOrderNumber(format!(
                "{}-{}-{}",
                PREFIX,
                date_key(date),
                sequence
            )));
        }
        Ok(OrderNumber { date, sequence })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }
}

/// The counter key for a date: `YYYYMMDD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", PREFIX, date_key(self.date), self.sequence)
    }
}

impl FromStr for OrderNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidOrderNumber(s.to_string());

        let mut parts = s.split('-');
        let (prefix, date, seq) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(date), Some(seq), None) => (prefix, date, seq),
            _ => return Err(invalid()),
        };

        if prefix != PREFIX || date.len() != 8 || seq.len() < 4 {
            return Err(invalid());
        }
        if !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;
        let sequence: i64 = seq.parse().map_err(|_| invalid())?;

        OrderNumber::new(date, sequence).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_format_is_zero_padded() {
        let number = OrderNumber::new(day(), 7).unwrap();
        assert_eq!(number.to_string(), "ORD-20261016-0007");
    }

    #[test]
    fn test_sequence_widens_past_four_digits() {
        let number = OrderNumber::new(day(), 12_345).unwrap();
        assert_eq!(number.to_string(), "ORD-20261016-12345");
    }

    #[test]
    fn test_sequence_must_start_at_one() {
        assert!(OrderNumber::new(day(), 0).is_err());
    }

    #[test]
    fn test_parse() {
        let number: OrderNumber = "ORD-20261016-0042".parse().unwrap();
        assert_eq!(number.date(), day());
        assert_eq!(number.sequence(), 42);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "ORD-20261016",
            "INV-20261016-0001",
            "ORD-20261332-0001",
            "ORD-20261016-01",
            "ORD-20261016-00a1",
            "ORD-20261016-0001-9",
        ] {
            assert!(bad.parse::<OrderNumber>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(day()), "20261016");
    }
}
