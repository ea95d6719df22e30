//! Hold entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seathold_core::types::id::{HoldId, HolderId, SeatId};

use super::status::HoldStatus;

/// One checkout attempt: a time-bounded exclusive claim on a fixed seat
/// set by one holder.
///
/// The hold row is the single source of truth correlating a holder to a
/// seat set; the per-seat `holder_id`/`hold_expires_at` fields are a
/// denormalized projection for fast availability queries and must always
/// agree with the active hold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hold {
    /// Unique hold identifier.
    pub id: HoldId,
    /// The actor who placed the hold.
    pub holder_id: HolderId,
    /// The seats claimed. Fixed at creation.
    pub seat_ids: Vec<SeatId>,
    /// Current lifecycle status.
    pub status: HoldStatus,
    /// When the hold was placed.
    pub created_at: DateTime<Utc>,
    /// When the hold lapses unless finalized.
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    /// Create a new pending hold over `seat_ids` with the given TTL.
    ///
    /// `now` is supplied by the caller so the deadline is anchored to the
    /// same clock every expiry comparison uses (the acquiring
    /// transaction's), not the application host's.
    pub fn new(
        holder_id: HolderId,
        seat_ids: Vec<SeatId>,
        ttl_seconds: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HoldId::new(),
            holder_id,
            seat_ids,
            status: HoldStatus::Pending,
            created_at: now,
            expires_at: now + Duration::seconds(i64::from(ttl_seconds)),
        }
    }

    /// Whether the hold is still eligible for finalize or release.
    pub fn is_active(&self) -> bool {
        self.status == HoldStatus::Pending
    }

    /// Whether the deadline has passed at instant `now`.
    ///
    /// Same strict comparison as the sweep and the lazy-expiry check.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hold_is_pending_with_ttl_deadline() {
        let now = Utc::now();
        let hold = Hold::new(HolderId::new(), vec![SeatId::new(), SeatId::new()], 60, now);
        assert!(hold.is_active());
        assert_eq!(hold.seat_ids.len(), 2);
        assert_eq!(hold.created_at, now);
        assert_eq!(hold.expires_at, now + Duration::seconds(60));
    }

    #[test]
    fn test_expiry_comparison_is_strict() {
        let hold = Hold::new(HolderId::new(), vec![SeatId::new()], 10, Utc::now());
        assert!(!hold.is_expired(hold.expires_at));
        assert!(hold.is_expired(hold.expires_at + Duration::milliseconds(1)));
    }

    #[test]
    fn test_terminal_holds_are_not_active() {
        let mut hold = Hold::new(HolderId::new(), vec![SeatId::new()], 10, Utc::now());
        hold.status = HoldStatus::Confirmed;
        assert!(!hold.is_active());
        hold.status = HoldStatus::Expired;
        assert!(!hold.is_active());
    }
}
