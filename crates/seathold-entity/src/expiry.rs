//! Durable expiry queue entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seathold_core::types::id::{HoldId, HolderId, SeatId};

use crate::hold::Hold;

/// A durable record guaranteeing a hold's release survives process
/// restarts.
///
/// Inserted in the same transaction that creates a hold, deleted in the
/// same transaction that moves the hold to any terminal state. The
/// in-process timer is a best-effort optimization; this table, swept
/// periodically, is the correctness backstop.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpiryEntry {
    /// The hold this entry backs.
    pub hold_id: HoldId,
    /// The seats the hold covers.
    pub seat_ids: Vec<SeatId>,
    /// The holder who placed the hold.
    pub holder_id: HolderId,
    /// When the hold lapses.
    pub expires_at: DateTime<Utc>,
}

impl From<&Hold> for ExpiryEntry {
    fn from(hold: &Hold) -> Self {
        Self {
            hold_id: hold.id,
            seat_ids: hold.seat_ids.clone(),
            holder_id: hold.holder_id,
            expires_at: hold.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seathold_core::types::id::HolderId;

    #[test]
    fn test_entry_mirrors_hold() {
        let hold = Hold::new(HolderId::new(), vec![SeatId::new(), SeatId::new()], 30, Utc::now());
        let entry = ExpiryEntry::from(&hold);
        assert_eq!(entry.hold_id, hold.id);
        assert_eq!(entry.seat_ids, hold.seat_ids);
        assert_eq!(entry.holder_id, hold.holder_id);
        assert_eq!(entry.expires_at, hold.expires_at);
    }
}
