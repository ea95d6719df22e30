//! Post-commit notification helpers.

use std::collections::BTreeMap;
use std::sync::Arc;

use seathold_core::events::SeatUpdate;
use seathold_core::traits::SeatNotifier;
use seathold_core::types::id::{EventId, HolderId, SeatId};
use seathold_core::types::status::SeatStatus;

/// Group released/locked/booked seats by their venue event.
///
/// A hold normally covers a single event, but nothing in the schema
/// forbids mixed sets, so updates are fanned out per event channel.
pub(crate) fn group_by_event(pairs: &[(SeatId, EventId)]) -> BTreeMap<EventId, Vec<SeatId>> {
    let mut grouped: BTreeMap<EventId, Vec<SeatId>> = BTreeMap::new();
    for (seat_id, event_id) in pairs {
        grouped.entry(*event_id).or_default().push(*seat_id);
    }
    grouped
}

/// Publish one update per affected event. Runs strictly after commit;
/// the notifier contract guarantees this can never fail the caller.
pub(crate) async fn publish_grouped(
    notifier: &Arc<dyn SeatNotifier>,
    pairs: &[(SeatId, EventId)],
    status: SeatStatus,
    holder_id: Option<HolderId>,
) {
    for (event_id, seat_ids) in group_by_event(pairs) {
        notifier
            .publish(SeatUpdate::new(event_id, seat_ids, status, holder_id))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_event_partitions_pairs() {
        let ev_a = EventId::new();
        let ev_b = EventId::new();
        let s1 = SeatId::new();
        let s2 = SeatId::new();
        let s3 = SeatId::new();

        let grouped = group_by_event(&[(s1, ev_a), (s2, ev_b), (s3, ev_a)]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&ev_a], vec![s1, s3]);
        assert_eq!(grouped[&ev_b], vec![s2]);
    }

    #[test]
    fn test_group_by_event_empty() {
        assert!(group_by_event(&[]).is_empty());
    }
}
