//! Seat-update events broadcast to live clients.
//!
//! Events are emitted only after the underlying transaction has committed.
//! Delivery is at-least-once with no ordering guarantee stronger than
//! per-seat, roughly causal with commit order; clients can always
//! re-fetch current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::{EventId, HolderId, SeatId};
use crate::types::status::SeatStatus;

/// A seat-state transition fanned out to subscribers of one venue event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatUpdate {
    /// Unique ID of this broadcast message.
    pub id: Uuid,
    /// The venue event whose seat map changed.
    pub event_id: EventId,
    /// The seats that transitioned.
    pub seat_ids: Vec<SeatId>,
    /// The status the seats transitioned to.
    pub status: SeatStatus,
    /// The holder involved, when the transition has one (Locked).
    pub holder_id: Option<HolderId>,
    /// When the update was emitted.
    pub timestamp: DateTime<Utc>,
}

impl SeatUpdate {
    /// Create a new seat update stamped with the current time.
    pub fn new(
        event_id: EventId,
        seat_ids: Vec<SeatId>,
        status: SeatStatus,
        holder_id: Option<HolderId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            seat_ids,
            status,
            holder_id,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_status_as_string() {
        let update = SeatUpdate::new(
            EventId::new(),
            vec![SeatId::new()],
            SeatStatus::Locked,
            Some(HolderId::new()),
        );
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["status"], "locked");
        assert!(json["holder_id"].is_string());
    }
}
