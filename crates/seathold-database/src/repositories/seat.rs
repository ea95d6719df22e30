//! Seat repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seathold_core::error::{AppError, ErrorKind};
use seathold_core::result::AppResult;
use seathold_core::types::id::{BookingId, EventId, HolderId, SeatId};
use seathold_entity::seat::{Seat, SeatStatusView};

use crate::PgTx;

/// Repository for seat reads and the transactional status transitions the
/// lock manager and finalizer compose.
#[derive(Debug, Clone)]
pub struct SeatRepository {
    pool: PgPool,
}

impl SeatRepository {
    /// Create a new seat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the current rows for the given seat ids.
    ///
    /// Returns whatever exists; callers decide whether missing ids are an
    /// error.
    pub async fn find_by_ids(&self, ids: &[SeatId]) -> AppResult<Vec<Seat>> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find seats", e))
    }

    /// List the seats of one section, ordered by row then number for
    /// display.
    pub async fn find_by_section(&self, event_id: EventId, section: &str) -> AppResult<Vec<Seat>> {
        sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE event_id = $1 AND section = $2 \
             ORDER BY \"row\" ASC, number ASC",
        )
        .bind(event_id)
        .bind(section)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list section seats", e)
        })
    }

    /// Fetch the dynamic-state projection for the given seat ids.
    pub async fn status_view(&self, ids: &[SeatId]) -> AppResult<Vec<SeatStatusView>> {
        sqlx::query_as::<_, SeatStatusView>(
            "SELECT id, status, holder_id, hold_expires_at FROM seats WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch seat status", e)
        })
    }

    /// Select the given seat rows with exclusive row locks.
    ///
    /// This is the serialization point for concurrent acquisition: two
    /// transactions locking overlapping seat sets are ordered by the
    /// database, and the loser observes the winner's committed update.
    /// Rows are locked in id order so overlapping acquisitions cannot
    /// deadlock each other.
    pub async fn lock_for_update(&self, tx: &mut PgTx<'_>, ids: &[SeatId]) -> AppResult<Vec<Seat>> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock seat rows", e)
            })
    }

    /// Transition the given seats to Locked under `holder` with the given
    /// deadline. Caller must have verified acquirability under row locks.
    pub async fn mark_locked(
        &self,
        tx: &mut PgTx<'_>,
        ids: &[SeatId],
        holder: HolderId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE seats SET status = 'locked', holder_id = $2, hold_expires_at = $3, \
             booking_id = NULL, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(holder)
        .bind(expires_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock seats", e))?;

        Ok(result.rows_affected())
    }

    /// Return to Available every requested seat currently Locked by
    /// `holder`, and report which seats (with their events) were
    /// released. Seats held by someone else are left untouched.
    pub async fn release_for_holder(
        &self,
        tx: &mut PgTx<'_>,
        ids: &[SeatId],
        holder: HolderId,
    ) -> AppResult<Vec<(SeatId, EventId)>> {
        sqlx::query_as::<_, (SeatId, EventId)>(
            "UPDATE seats SET status = 'available', holder_id = NULL, hold_expires_at = NULL, \
             updated_at = NOW() \
             WHERE id = ANY($1) AND status = 'locked' AND holder_id = $2 \
             RETURNING id, event_id",
        )
        .bind(ids)
        .bind(holder)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release seats", e))
    }

    /// Return to Available the seats of one lapsed hold: only rows still
    /// Locked by its holder with that hold's exact deadline.
    ///
    /// The deadline guard distinguishes the lapsed hold's projection from
    /// a newer one: a seat the same holder re-acquired after the old hold
    /// lapsed carries the new hold's deadline and is left untouched.
    pub async fn release_expired_for_hold(
        &self,
        tx: &mut PgTx<'_>,
        ids: &[SeatId],
        holder: HolderId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Vec<(SeatId, EventId)>> {
        sqlx::query_as::<_, (SeatId, EventId)>(
            "UPDATE seats SET status = 'available', holder_id = NULL, hold_expires_at = NULL, \
             updated_at = NOW() \
             WHERE id = ANY($1) AND status = 'locked' AND holder_id = $2 \
             AND hold_expires_at = $3 \
             RETURNING id, event_id",
        )
        .bind(ids)
        .bind(holder)
        .bind(expires_at)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release expired seats", e)
        })
    }

    /// Transition Locked seats of `holder` to Booked under `booking_id`,
    /// clearing the hold projection fields.
    pub async fn mark_booked(
        &self,
        tx: &mut PgTx<'_>,
        ids: &[SeatId],
        holder: HolderId,
        booking_id: BookingId,
    ) -> AppResult<Vec<(SeatId, EventId)>> {
        sqlx::query_as::<_, (SeatId, EventId)>(
            "UPDATE seats SET status = 'booked', booking_id = $3, holder_id = NULL, \
             hold_expires_at = NULL, updated_at = NOW() \
             WHERE id = ANY($1) AND status = 'locked' AND holder_id = $2 \
             RETURNING id, event_id",
        )
        .bind(ids)
        .bind(holder)
        .bind(booking_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to book seats", e))
    }
}
