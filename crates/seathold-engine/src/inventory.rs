//! Read-only inventory queries.
//!
//! No side effects; all mutation happens through the lock manager and
//! booking finalizer so the locking discipline stays centralized.

use std::collections::HashSet;
use std::sync::Arc;

use seathold_core::error::AppError;
use seathold_core::result::AppResult;
use seathold_core::types::id::{EventId, SeatId};
use seathold_database::repositories::SeatRepository;
use seathold_entity::seat::{Seat, SeatStatusView};

/// Durable seat records and bulk status queries.
#[derive(Debug, Clone)]
pub struct Inventory {
    seats: Arc<SeatRepository>,
}

impl Inventory {
    /// Create a new inventory view over the seat repository.
    pub fn new(seats: Arc<SeatRepository>) -> Self {
        Self { seats }
    }

    /// Return the current row for each id; any missing id is an error.
    pub async fn get_by_ids(&self, seat_ids: &[SeatId]) -> AppResult<Vec<Seat>> {
        let seats = self.seats.find_by_ids(seat_ids).await?;
        ensure_all_found(seat_ids, seats.iter().map(|s| s.id))?;
        Ok(seats)
    }

    /// Seats of one section, ordered by row then number for display.
    pub async fn get_by_section(&self, event_id: EventId, section: &str) -> AppResult<Vec<Seat>> {
        self.seats.find_by_section(event_id, section).await
    }

    /// Dynamic-state projection for status-check endpoints.
    pub async fn get_seat_status(&self, seat_ids: &[SeatId]) -> AppResult<Vec<SeatStatusView>> {
        let views = self.seats.status_view(seat_ids).await?;
        ensure_all_found(seat_ids, views.iter().map(|v| v.id))?;
        Ok(views)
    }
}

fn ensure_all_found(
    requested: &[SeatId],
    found: impl Iterator<Item = SeatId>,
) -> AppResult<()> {
    let present: HashSet<SeatId> = found.collect();
    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !present.contains(id))
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "Unknown seats: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_all_found_accepts_complete_results() {
        let a = SeatId::new();
        let b = SeatId::new();
        assert!(ensure_all_found(&[a, b], [b, a].into_iter()).is_ok());
    }

    #[test]
    fn test_ensure_all_found_names_missing_ids() {
        let a = SeatId::new();
        let b = SeatId::new();
        let err = ensure_all_found(&[a, b], [a].into_iter()).unwrap_err();
        assert!(err.message.contains(&b.to_string()));
        assert!(!err.message.contains(&a.to_string()));
    }
}
