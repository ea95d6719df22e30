//! Booking finalizer: the only path from Locked to Booked.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use seathold_core::error::AppError;
use seathold_core::result::AppResult;
use seathold_core::traits::SeatNotifier;
use seathold_core::types::id::{BookingId, HoldId, SeatId};
use seathold_core::types::status::SeatStatus;
use seathold_database::repositories::{ExpiryRepository, HoldRepository, SeatRepository};
use seathold_database::transaction_now;
use seathold_entity::hold::HoldStatus;

use crate::notify::publish_grouped;
use crate::timers::TimerRegistry;

/// Result of a successful finalize.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    /// The hold that was confirmed.
    pub hold_id: HoldId,
    /// The booking the seats are now linked to.
    pub booking_id: BookingId,
    /// The seats transitioned to Booked.
    pub booked: Vec<SeatId>,
}

/// Converts a pending hold into a permanent booking, or fails cleanly.
pub struct BookingFinalizer {
    pool: PgPool,
    seats: Arc<SeatRepository>,
    holds: Arc<HoldRepository>,
    expiry_queue: Arc<ExpiryRepository>,
    timers: Arc<TimerRegistry>,
    notifier: Arc<dyn SeatNotifier>,
}

impl std::fmt::Debug for BookingFinalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFinalizer").finish()
    }
}

impl BookingFinalizer {
    /// Create a new booking finalizer.
    pub fn new(
        pool: PgPool,
        seats: Arc<SeatRepository>,
        holds: Arc<HoldRepository>,
        expiry_queue: Arc<ExpiryRepository>,
        timers: Arc<TimerRegistry>,
        notifier: Arc<dyn SeatNotifier>,
    ) -> Self {
        Self {
            pool,
            seats,
            holds,
            expiry_queue,
            timers,
            notifier,
        }
    }

    /// Convert the hold's seats from Locked to Booked under `booking_id`.
    ///
    /// The hold row is locked first, serializing finalize against the
    /// expiry release of the same hold. A hold that is no longer pending
    /// fails with `HoldNotActive`; one past its deadline fails with
    /// `HoldExpired` and mutates nothing; the sweep reconciles the
    /// seats at its own pace.
    pub async fn finalize(
        &self,
        hold_id: HoldId,
        booking_id: BookingId,
    ) -> AppResult<FinalizeOutcome> {
        let mut tx = self.pool.begin().await?;
        // Same timestamp source as the lazy-expiry check and the sweep.
        let now = transaction_now(&mut tx).await?;

        let hold = self
            .holds
            .lock_by_id(&mut tx, hold_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unknown hold: {hold_id}")))?;

        if !hold.is_active() {
            tx.rollback().await?;
            return Err(AppError::hold_not_active(format!(
                "Hold {hold_id} is {}",
                hold.status
            )));
        }

        if hold.is_expired(now) {
            tx.rollback().await?;
            return Err(AppError::hold_expired(format!(
                "Hold {hold_id} expired at {}",
                hold.expires_at
            )));
        }

        let pairs = self
            .seats
            .mark_booked(&mut tx, &hold.seat_ids, hold.holder_id, booking_id)
            .await?;
        if pairs.len() != hold.seat_ids.len() {
            // A pending, unexpired hold must still cover all its seats;
            // anything else means the projection drifted.
            tx.rollback().await?;
            return Err(AppError::internal(format!(
                "Hold {hold_id} covers {} seats but only {} were locked",
                hold.seat_ids.len(),
                pairs.len()
            )));
        }

        self.holds
            .set_status(&mut tx, hold_id, HoldStatus::Confirmed)
            .await?;
        self.expiry_queue.delete(&mut tx, hold_id).await?;
        tx.commit().await?;

        self.timers.cancel(hold_id);

        info!(
            hold_id = %hold_id,
            booking_id = %booking_id,
            seats = pairs.len(),
            "Hold finalized"
        );
        publish_grouped(&self.notifier, &pairs, SeatStatus::Booked, None).await;

        Ok(FinalizeOutcome {
            hold_id,
            booking_id,
            booked: pairs.into_iter().map(|(seat_id, _)| seat_id).collect(),
        })
    }
}
