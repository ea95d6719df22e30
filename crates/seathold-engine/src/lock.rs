//! The lock manager: the only component allowed to move seats into and
//! out of the Locked state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use seathold_core::config::EngineConfig;
use seathold_core::error::AppError;
use seathold_core::result::AppResult;
use seathold_core::traits::SeatNotifier;
use seathold_core::types::id::{HoldId, HolderId, SeatId};
use seathold_core::types::status::SeatStatus;
use seathold_database::repositories::{ExpiryRepository, HoldRepository, SeatRepository};
use seathold_database::transaction_now;
use seathold_entity::expiry::ExpiryEntry;
use seathold_entity::hold::Hold;
use seathold_entity::seat::Seat;

use crate::expiry::ExpiryService;
use crate::notify::publish_grouped;
use crate::timers::TimerRegistry;

/// Result of an acquisition attempt. All-or-nothing: a rejected request
/// changes no seat.
#[derive(Debug, Clone)]
pub enum AcquireOutcome {
    /// Every requested seat was locked under a new pending hold.
    Granted {
        /// The hold created for this checkout attempt.
        hold_id: HoldId,
        /// The seats locked (the full, deduplicated request set).
        locked: Vec<SeatId>,
        /// When the hold lapses unless finalized.
        expires_at: DateTime<Utc>,
    },
    /// At least one seat was not acquirable; nothing was locked.
    Rejected {
        /// The specific seats that blocked the request, so a UI can
        /// highlight them.
        unavailable: Vec<SeatId>,
    },
}

/// Acquires and releases short-lived exclusive holds on seats within
/// relational transactions, enforcing at-most-one-holder-per-seat.
pub struct LockManager {
    pool: PgPool,
    seats: Arc<SeatRepository>,
    holds: Arc<HoldRepository>,
    expiry_queue: Arc<ExpiryRepository>,
    expiry: Arc<ExpiryService>,
    timers: Arc<TimerRegistry>,
    notifier: Arc<dyn SeatNotifier>,
    config: EngineConfig,
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager").finish()
    }
}

impl LockManager {
    /// Create a new lock manager.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        seats: Arc<SeatRepository>,
        holds: Arc<HoldRepository>,
        expiry_queue: Arc<ExpiryRepository>,
        expiry: Arc<ExpiryService>,
        timers: Arc<TimerRegistry>,
        notifier: Arc<dyn SeatNotifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            pool,
            seats,
            holds,
            expiry_queue,
            expiry,
            timers,
            notifier,
            config,
        }
    }

    /// Attempt to place a hold on `seat_ids` for `holder`.
    ///
    /// The whole decision happens under exclusive row locks in a single
    /// transaction: whichever concurrent attempt commits first wins, the
    /// others observe the updated rows and are rejected with the specific
    /// unavailable seats. On success the hold, its expiry queue entry,
    /// and the seat updates commit atomically; the in-process timer and
    /// the Locked broadcast happen after commit.
    pub async fn acquire(
        &self,
        seat_ids: &[SeatId],
        holder: HolderId,
        ttl_seconds: Option<u32>,
    ) -> AppResult<AcquireOutcome> {
        let seat_ids = dedupe(seat_ids);
        if seat_ids.is_empty() {
            return Err(AppError::validation("Seat set must not be empty"));
        }
        if seat_ids.len() > self.config.max_seats_per_hold {
            return Err(AppError::validation(format!(
                "A hold may cover at most {} seats",
                self.config.max_seats_per_hold
            )));
        }

        let ttl = ttl_seconds.unwrap_or(self.config.default_ttl_seconds);
        if ttl == 0 || ttl > self.config.max_ttl_seconds {
            return Err(AppError::validation(format!(
                "TTL must be between 1 and {} seconds",
                self.config.max_ttl_seconds
            )));
        }

        let mut tx = self.pool.begin().await?;
        // The transaction clock is the only instant deadlines are judged
        // against; the sweep's due-entry scan uses the same source.
        let now = transaction_now(&mut tx).await?;

        let seats = self.seats.lock_for_update(&mut tx, &seat_ids).await?;
        let missing = missing_ids(&seat_ids, &seats);
        if !missing.is_empty() {
            tx.rollback().await?;
            return Err(AppError::not_found(format!(
                "Unknown seats: {}",
                join_ids(&missing)
            )));
        }

        let unavailable = unacquirable_ids(&seats, now);
        if !unavailable.is_empty() {
            tx.rollback().await?;
            info!(
                holder_id = %holder,
                requested = seat_ids.len(),
                unavailable = unavailable.len(),
                "Acquisition rejected"
            );
            return Ok(AcquireOutcome::Rejected { unavailable });
        }

        let hold = Hold::new(holder, seat_ids.clone(), ttl, now);
        self.seats
            .mark_locked(&mut tx, &seat_ids, holder, hold.expires_at)
            .await?;
        self.holds.insert(&mut tx, &hold).await?;
        self.expiry_queue
            .insert(&mut tx, &ExpiryEntry::from(&hold))
            .await?;
        tx.commit().await?;

        info!(
            hold_id = %hold.id,
            holder_id = %holder,
            seats = seat_ids.len(),
            ttl_seconds = ttl,
            "Hold acquired"
        );

        self.schedule_release(hold.id, Duration::from_secs(u64::from(ttl)));

        let pairs: Vec<_> = seats.iter().map(|s| (s.id, s.event_id)).collect();
        publish_grouped(&self.notifier, &pairs, SeatStatus::Locked, Some(holder)).await;

        Ok(AcquireOutcome::Granted {
            hold_id: hold.id,
            locked: seat_ids,
            expires_at: hold.expires_at,
        })
    }

    /// Release the requested seats held by `holder` back to Available.
    ///
    /// Seats not locked by this holder are silently skipped; the caller
    /// already lost that race, and a second release of the same set is a
    /// no-op. Returns the seats actually released.
    pub async fn release(&self, seat_ids: &[SeatId], holder: HolderId) -> AppResult<Vec<SeatId>> {
        let seat_ids = dedupe(seat_ids);
        if seat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;

        let released = self
            .seats
            .release_for_holder(&mut tx, &seat_ids, holder)
            .await?;
        let released_holds = self
            .holds
            .release_satisfied(&mut tx, holder, &seat_ids)
            .await?;
        if !released_holds.is_empty() {
            self.expiry_queue
                .delete_many(&mut tx, &released_holds)
                .await?;
        }
        tx.commit().await?;

        for hold_id in &released_holds {
            self.timers.cancel(*hold_id);
        }

        if !released.is_empty() {
            info!(
                holder_id = %holder,
                seats = released.len(),
                holds = released_holds.len(),
                "Seats released"
            );
            publish_grouped(&self.notifier, &released, SeatStatus::Available, None).await;
        }

        Ok(released.into_iter().map(|(seat_id, _)| seat_id).collect())
    }

    /// Register the deferred release for a freshly acquired hold.
    fn schedule_release(&self, hold_id: HoldId, delay: Duration) {
        let expiry = Arc::clone(&self.expiry);
        self.timers.schedule(hold_id, delay, async move {
            if let Err(e) = expiry.release_expired(hold_id).await {
                // The durable sweep retries this entry on its next pass.
                warn!(hold_id = %hold_id, error = %e, "In-process expiry release failed");
            }
        });
    }
}

/// Deduplicate a seat id list, preserving first-seen order.
fn dedupe(seat_ids: &[SeatId]) -> Vec<SeatId> {
    let mut seen = HashSet::with_capacity(seat_ids.len());
    seat_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Requested ids with no corresponding row.
fn missing_ids(requested: &[SeatId], found: &[Seat]) -> Vec<SeatId> {
    let present: HashSet<SeatId> = found.iter().map(|s| s.id).collect();
    requested
        .iter()
        .copied()
        .filter(|id| !present.contains(id))
        .collect()
}

/// Seats in the locked row set that block acquisition at instant `now`.
fn unacquirable_ids(seats: &[Seat], now: DateTime<Utc>) -> Vec<SeatId> {
    seats
        .iter()
        .filter(|s| !s.is_acquirable(now))
        .map(|s| s.id)
        .collect()
}

fn join_ids(ids: &[SeatId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use seathold_core::types::id::EventId;

    fn seat(status: SeatStatus) -> Seat {
        let now = Utc::now();
        Seat {
            id: SeatId::new(),
            event_id: EventId::new(),
            section: "A".to_string(),
            row: "1".to_string(),
            number: 1,
            price: 4500,
            category: "standard".to_string(),
            status,
            holder_id: None,
            hold_expires_at: None,
            booking_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_dedupe_preserves_order() {
        let a = SeatId::new();
        let b = SeatId::new();
        assert_eq!(dedupe(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_missing_ids_reports_unknown_seats() {
        let known = seat(SeatStatus::Available);
        let unknown = SeatId::new();
        let missing = missing_ids(&[known.id, unknown], std::slice::from_ref(&known));
        assert_eq!(missing, vec![unknown]);
    }

    #[test]
    fn test_unacquirable_partition() {
        let now = Utc::now();
        let free = seat(SeatStatus::Available);
        let booked = seat(SeatStatus::Booked);
        let mut lapsed = seat(SeatStatus::Locked);
        lapsed.holder_id = Some(HolderId::new());
        lapsed.hold_expires_at = Some(now - ChronoDuration::seconds(1));
        let mut live = seat(SeatStatus::Locked);
        live.holder_id = Some(HolderId::new());
        live.hold_expires_at = Some(now + ChronoDuration::seconds(60));

        let blockers = unacquirable_ids(&[free.clone(), booked.clone(), lapsed, live.clone()], now);
        assert_eq!(blockers, vec![booked.id, live.id]);
    }
}
