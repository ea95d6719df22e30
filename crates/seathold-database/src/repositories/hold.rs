//! Hold repository implementation.

use sqlx::PgPool;

use seathold_core::error::{AppError, ErrorKind};
use seathold_core::result::AppResult;
use seathold_core::types::id::{HoldId, HolderId, SeatId};
use seathold_entity::hold::{Hold, HoldStatus};

use crate::PgTx;

/// Repository for hold rows.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    pool: PgPool,
}

impl HoldRepository {
    /// Create a new hold repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a hold by ID.
    pub async fn find_by_id(&self, id: HoldId) -> AppResult<Option<Hold>> {
        sqlx::query_as::<_, Hold>("SELECT * FROM holds WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find hold", e))
    }

    /// Load a hold with an exclusive row lock.
    ///
    /// Serializes finalize against the expiry release of the same hold:
    /// whichever transaction locks the row first decides the terminal
    /// state, the other observes it and no-ops or fails.
    pub async fn lock_by_id(&self, tx: &mut PgTx<'_>, id: HoldId) -> AppResult<Option<Hold>> {
        sqlx::query_as::<_, Hold>("SELECT * FROM holds WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock hold row", e))
    }

    /// Insert a new hold.
    pub async fn insert(&self, tx: &mut PgTx<'_>, hold: &Hold) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO holds (id, holder_id, seat_ids, status, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(hold.id)
        .bind(hold.holder_id)
        .bind(&hold.seat_ids)
        .bind(hold.status)
        .bind(hold.created_at)
        .bind(hold.expires_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert hold", e))?;

        Ok(())
    }

    /// Move a hold to a new status.
    pub async fn set_status(
        &self,
        tx: &mut PgTx<'_>,
        id: HoldId,
        status: HoldStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE holds SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update hold status", e)
            })?;

        Ok(())
    }

    /// Mark Released every pending hold of `holder` that overlaps the
    /// given seats and no longer has any seat Locked by that holder.
    ///
    /// Holds that still cover a locked seat (a partial release request)
    /// stay pending; their expiry entry remains and the sweep reconciles
    /// the remainder at the deadline.
    pub async fn release_satisfied(
        &self,
        tx: &mut PgTx<'_>,
        holder: HolderId,
        seat_ids: &[SeatId],
    ) -> AppResult<Vec<HoldId>> {
        let ids: Vec<HoldId> = sqlx::query_scalar(
            "UPDATE holds h SET status = 'released' \
             WHERE h.holder_id = $1 AND h.status = 'pending' AND h.seat_ids && $2 \
             AND NOT EXISTS ( \
                SELECT 1 FROM seats s \
                WHERE s.id = ANY(h.seat_ids) AND s.status = 'locked' AND s.holder_id = $1 \
             ) \
             RETURNING h.id",
        )
        .bind(holder)
        .bind(seat_ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release holds", e))?;

        Ok(ids)
    }
}
