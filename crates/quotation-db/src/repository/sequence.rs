//! # Order Number Sequence
//!
//! The atomic per-date counter behind `ORD-YYYYMMDD-NNNN`.
//!
//! ## Why a counter row
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  count(*) + 1 (racy)               │  counter row (atomic)              │
//! │                                     │                                    │
//! │  tx A: SELECT COUNT(*) → 4          │  tx A: UPSERT ... RETURNING → 5    │
//! │  tx B: SELECT COUNT(*) → 4          │  tx B: waits on the write lock     │
//! │  tx A: INSERT ORD-..-0005           │  tx A: INSERT ORD-..-0005, COMMIT  │
//! │  tx B: INSERT ORD-..-0005  ✗        │  tx B: UPSERT ... RETURNING → 6    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The upsert must be the first statement of the create transaction: it
//! takes SQLite's write lock before the transaction has read anything, so
//! a second writer queues on `busy_timeout` instead of working from a
//! stale snapshot.

use sqlx::SqliteExecutor;
use tracing::debug;

use crate::error::DbResult;

/// Atomically increments and returns the counter for `date_key`.
///
/// The first call for a key returns 1. A value drawn by a transaction that
/// rolls back is rolled back with it.
pub async fn next_order_sequence<'e, E>(executor: E, date_key: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let value: i64 = sqlx::query_scalar(
        "INSERT INTO order_sequences (date_key, last_value) VALUES (?1, 1) \
         ON CONFLICT (date_key) DO UPDATE SET last_value = last_value + 1 \
         RETURNING last_value",
    )
    .bind(date_key)
    .fetch_one(executor)
    .await?;

    debug!(date_key, value, "Drew order sequence value");
    Ok(value)
}

/// Reads the last value handed out for `date_key` without advancing it.
pub async fn current_order_sequence<'e, E>(executor: E, date_key: &str) -> DbResult<Option<i64>>
where
    E: SqliteExecutor<'e>,
{
    let value: Option<i64> =
        sqlx::query_scalar("SELECT last_value FROM order_sequences WHERE date_key = ?1")
            .bind(date_key)
            .fetch_optional(executor)
            .await?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_counter_starts_at_one_and_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(current_order_sequence(db.pool(), "20261016").await.unwrap(), None);
        assert_eq!(next_order_sequence(db.pool(), "20261016").await.unwrap(), 1);
        assert_eq!(next_order_sequence(db.pool(), "20261016").await.unwrap(), 2);
        assert_eq!(next_order_sequence(db.pool(), "20261016").await.unwrap(), 3);
        assert_eq!(current_order_sequence(db.pool(), "20261016").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_counters_are_per_date() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        next_order_sequence(db.pool(), "20261016").await.unwrap();
        next_order_sequence(db.pool(), "20261016").await.unwrap();
        assert_eq!(next_order_sequence(db.pool(), "20261017").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rolled_back_draw_is_reissued() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            assert_eq!(next_order_sequence(&mut *tx, "20261016").await.unwrap(), 1);
        }

        assert_eq!(next_order_sequence(db.pool(), "20261016").await.unwrap(), 1);
    }
}
