//! Expiry release path: the idempotent conversion of a lapsed pending
//! hold back into available inventory.
//!
//! Called from two places: the in-process timer (low latency, lost on
//! restart) and the durable sweep (the correctness guarantee). Both call
//! the same transaction, so running twice, even from two processes at
//! once, converges on the same state.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use seathold_core::result::AppResult;
use seathold_core::traits::SeatNotifier;
use seathold_core::types::id::{EventId, HoldId, SeatId};
use seathold_core::types::status::SeatStatus;
use seathold_database::repositories::{ExpiryRepository, HoldRepository, SeatRepository};

use crate::notify::publish_grouped;
use crate::retry::{retry_transient, RetryPolicy};
use crate::timers::TimerRegistry;

/// Result of one expiry release call.
#[derive(Debug, Clone)]
pub enum ExpiredRelease {
    /// The hold was already terminal (or gone); nothing changed.
    Noop,
    /// The hold was marked expired and these seats returned to Available.
    Released {
        /// Seats returned by this call. May be fewer than the hold's set
        /// if some were independently released already.
        seat_ids: Vec<SeatId>,
    },
}

/// Guarantees eventual release of every hold whose deadline passes
/// without confirmation.
pub struct ExpiryService {
    pool: PgPool,
    seats: Arc<SeatRepository>,
    holds: Arc<HoldRepository>,
    expiry_queue: Arc<ExpiryRepository>,
    timers: Arc<TimerRegistry>,
    notifier: Arc<dyn SeatNotifier>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ExpiryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryService").finish()
    }
}

impl ExpiryService {
    /// Create a new expiry service.
    pub fn new(
        pool: PgPool,
        seats: Arc<SeatRepository>,
        holds: Arc<HoldRepository>,
        expiry_queue: Arc<ExpiryRepository>,
        timers: Arc<TimerRegistry>,
        notifier: Arc<dyn SeatNotifier>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            pool,
            seats,
            holds,
            expiry_queue,
            timers,
            notifier,
            retry,
        }
    }

    /// Release a lapsed hold, idempotently.
    ///
    /// The database mutation is wrapped in bounded backoff to absorb
    /// transient contention; the queue entry is deleted only inside the
    /// committed transaction, so an exhausted retry leaves it for the
    /// next sweep pass. Notification runs after commit and is never
    /// retried.
    pub async fn release_expired(&self, hold_id: HoldId) -> AppResult<ExpiredRelease> {
        let released = retry_transient(self.retry, "release_expired", || {
            self.try_release(hold_id)
        })
        .await?;

        let Some(pairs) = released else {
            return Ok(ExpiredRelease::Noop);
        };

        self.timers.cancel(hold_id);

        info!(
            hold_id = %hold_id,
            seats = pairs.len(),
            "Expired hold released"
        );
        publish_grouped(&self.notifier, &pairs, SeatStatus::Available, None).await;

        Ok(ExpiredRelease::Released {
            seat_ids: pairs.into_iter().map(|(seat_id, _)| seat_id).collect(),
        })
    }

    /// One transactional release attempt. Returns the released seats, or
    /// `None` when the hold had already reached a terminal state.
    async fn try_release(&self, hold_id: HoldId) -> AppResult<Option<Vec<(SeatId, EventId)>>> {
        let mut tx = self.pool.begin().await?;

        let Some(hold) = self.holds.lock_by_id(&mut tx, hold_id).await? else {
            // Orphaned queue entry; drop it so the sweep stops rescanning.
            self.expiry_queue.delete(&mut tx, hold_id).await?;
            tx.commit().await?;
            return Ok(None);
        };

        if !hold.is_active() {
            self.expiry_queue.delete(&mut tx, hold_id).await?;
            tx.commit().await?;
            return Ok(None);
        }

        self.holds
            .set_status(&mut tx, hold_id, seathold_entity::hold::HoldStatus::Expired)
            .await?;
        // Only seats still carrying this hold's projection (same holder,
        // same deadline) revert. A seat the holder released, or lazily
        // re-acquired under a newer hold, keeps whatever state it has now.
        let pairs = self
            .seats
            .release_expired_for_hold(&mut tx, &hold.seat_ids, hold.holder_id, hold.expires_at)
            .await?;
        self.expiry_queue.delete(&mut tx, hold_id).await?;
        tx.commit().await?;

        Ok(Some(pairs))
    }
}
