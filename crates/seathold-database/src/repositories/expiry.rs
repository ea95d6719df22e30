//! Expiry queue repository implementation.

use sqlx::PgPool;

use seathold_core::error::{AppError, ErrorKind};
use seathold_core::result::AppResult;
use seathold_core::types::id::HoldId;
use seathold_entity::expiry::ExpiryEntry;

use crate::PgTx;

/// Repository for the durable expiry queue.
///
/// Entries are only ever deleted inside a committed transaction that also
/// moved the hold to a terminal state, so an entry that survives a crash
/// is guaranteed to be picked up by a later sweep pass.
#[derive(Debug, Clone)]
pub struct ExpiryRepository {
    pool: PgPool,
}

impl ExpiryRepository {
    /// Create a new expiry queue repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the entry backing a newly created hold.
    pub async fn insert(&self, tx: &mut PgTx<'_>, entry: &ExpiryEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO hold_expiry_queue (hold_id, seat_ids, holder_id, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.hold_id)
        .bind(&entry.seat_ids)
        .bind(entry.holder_id)
        .bind(entry.expires_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert expiry entry", e)
        })?;

        Ok(())
    }

    /// Delete the entry for one hold.
    pub async fn delete(&self, tx: &mut PgTx<'_>, hold_id: HoldId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM hold_expiry_queue WHERE hold_id = $1")
            .bind(hold_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expiry entry", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the entries for several holds at once.
    pub async fn delete_many(&self, tx: &mut PgTx<'_>, hold_ids: &[HoldId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM hold_expiry_queue WHERE hold_id = ANY($1)")
            .bind(hold_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expiry entries", e)
            })?;

        Ok(result.rows_affected())
    }

    /// List entries whose deadline has passed, oldest first.
    ///
    /// Uses the database clock with the same strict comparison as the
    /// lazy-expiry check in `acquire`, so the two paths agree on when a
    /// hold stops protecting its seats.
    pub async fn find_due(&self, limit: i64) -> AppResult<Vec<ExpiryEntry>> {
        sqlx::query_as::<_, ExpiryEntry>(
            "SELECT hold_id, seat_ids, holder_id, expires_at FROM hold_expiry_queue \
             WHERE expires_at < NOW() ORDER BY expires_at ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list due expiry entries", e)
        })
    }
}
