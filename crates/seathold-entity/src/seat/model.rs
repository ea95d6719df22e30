//! Seat entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seathold_core::types::id::{BookingId, EventId, HolderId, SeatId};
use seathold_core::types::status::SeatStatus;

/// A unit of sellable inventory with persistent identity and mutable
/// status.
///
/// Identity and pricing are immutable after venue setup; only `status`,
/// `holder_id`, `hold_expires_at`, and `booking_id` change over the
/// seat's lifetime. Invariants: `holder_id` and `hold_expires_at` are
/// non-null iff `status = Locked`; `booking_id` is non-null iff
/// `status = Booked`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Seat {
    /// Unique seat identifier.
    pub id: SeatId,
    /// The venue event this seat belongs to.
    pub event_id: EventId,
    /// Section label (e.g. "Balcony", "GA").
    pub section: String,
    /// Row label within the section.
    pub row: String,
    /// Seat number within the row.
    pub number: i32,
    /// Price in minor currency units (cents/paise).
    pub price: i64,
    /// Pricing/display category (e.g. "premium", "standard").
    pub category: String,
    /// Current lifecycle status.
    pub status: SeatStatus,
    /// The holder currently locking this seat, if any.
    pub holder_id: Option<HolderId>,
    /// When the current hold lapses, if locked.
    pub hold_expires_at: Option<DateTime<Utc>>,
    /// The booking this seat was sold under, if booked.
    pub booking_id: Option<BookingId>,
    /// When the seat row was created.
    pub created_at: DateTime<Utc>,
    /// When the seat row was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Seat {
    /// Whether a new hold may take this seat at instant `now`.
    ///
    /// A seat is acquirable when Available, or when Locked with a deadline
    /// strictly in the past: a lazily-detected expiry the background
    /// sweep has not yet caught up with. Both this check and the sweep
    /// compare `hold_expires_at < now` so neither path can consider a
    /// seat free while the other still treats the hold as live.
    pub fn is_acquirable(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SeatStatus::Available => true,
            SeatStatus::Locked => match self.hold_expires_at {
                Some(deadline) => deadline < now,
                // Locked without a deadline violates the seat invariant;
                // never treat it as free.
                None => false,
            },
            SeatStatus::Booked | SeatStatus::Reserved | SeatStatus::Unavailable => false,
        }
    }

    /// Whether this seat is currently locked by the given holder.
    pub fn is_locked_by(&self, holder: HolderId) -> bool {
        self.status == SeatStatus::Locked && self.holder_id == Some(holder)
    }
}

/// Read-only projection of a seat's dynamic state for status-check
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatStatusView {
    /// Seat identifier.
    pub id: SeatId,
    /// Current status.
    pub status: SeatStatus,
    /// Holder, when locked.
    pub holder_id: Option<HolderId>,
    /// Hold deadline, when locked.
    pub hold_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

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
    fn test_available_is_acquirable() {
        assert!(seat(SeatStatus::Available).is_acquirable(Utc::now()));
    }

    #[test]
    fn test_booked_reserved_unavailable_never_acquirable() {
        let now = Utc::now();
        assert!(!seat(SeatStatus::Booked).is_acquirable(now));
        assert!(!seat(SeatStatus::Reserved).is_acquirable(now));
        assert!(!seat(SeatStatus::Unavailable).is_acquirable(now));
    }

    #[test]
    fn test_locked_with_future_deadline_not_acquirable() {
        let now = Utc::now();
        let mut s = seat(SeatStatus::Locked);
        s.holder_id = Some(HolderId::new());
        s.hold_expires_at = Some(now + Duration::seconds(60));
        assert!(!s.is_acquirable(now));
    }

    #[test]
    fn test_locked_with_past_deadline_is_lazily_acquirable() {
        let now = Utc::now();
        let mut s = seat(SeatStatus::Locked);
        s.holder_id = Some(HolderId::new());
        s.hold_expires_at = Some(now - Duration::seconds(1));
        assert!(s.is_acquirable(now));
    }

    #[test]
    fn test_deadline_exactly_now_is_not_yet_expired() {
        // The comparison is strict: the sweep uses the same rule.
        let now = Utc::now();
        let mut s = seat(SeatStatus::Locked);
        s.holder_id = Some(HolderId::new());
        s.hold_expires_at = Some(now);
        assert!(!s.is_acquirable(now));
    }

    #[test]
    fn test_locked_without_deadline_is_never_acquirable() {
        let mut s = seat(SeatStatus::Locked);
        s.holder_id = Some(HolderId::new());
        assert!(!s.is_acquirable(Utc::now()));
    }

    #[test]
    fn test_is_locked_by_matches_holder() {
        let holder = HolderId::new();
        let mut s = seat(SeatStatus::Locked);
        s.holder_id = Some(holder);
        assert!(s.is_locked_by(holder));
        assert!(!s.is_locked_by(HolderId::new()));
    }
}
