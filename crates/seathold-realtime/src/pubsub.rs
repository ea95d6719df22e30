//! In-memory per-event pub/sub for single-node deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tracing::debug;

use seathold_core::config::RealtimeConfig;
use seathold_core::events::SeatUpdate;
use seathold_core::traits::SeatNotifier;
use seathold_core::types::id::EventId;

/// In-memory seat-update broadcaster.
///
/// One broadcast channel per venue event; the transport layer wrapping
/// this engine subscribes per event and forwards messages to its own
/// connections. Slow subscribers that overrun the channel buffer lose
/// messages and must re-fetch current seat state.
#[derive(Debug)]
pub struct SeatBroadcaster {
    /// Event id → broadcast sender.
    channels: RwLock<HashMap<EventId, broadcast::Sender<SeatUpdate>>>,
    /// Buffer size for new channels.
    buffer_size: usize,
}

impl SeatBroadcaster {
    /// Create a new broadcaster from configuration.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            // broadcast::channel panics on a zero capacity.
            buffer_size: config.channel_buffer.max(1),
        }
    }

    /// Subscribe to the seat updates of one event, creating its channel
    /// on first use.
    pub async fn subscribe(&self, event_id: EventId) -> broadcast::Receiver<SeatUpdate> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(event_id)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }

    /// Number of live subscribers for an event.
    pub async fn subscriber_count(&self, event_id: EventId) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&event_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SeatNotifier for SeatBroadcaster {
    async fn publish(&self, update: SeatUpdate) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&update.event_id) {
            // A send error only means no subscriber is listening right
            // now; the state change is already committed.
            if tx.send(update).is_err() {
                debug!("Seat update dropped: no live subscribers");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seathold_core::types::id::{HolderId, SeatId};
    use seathold_core::types::status::SeatStatus;

    fn broadcaster() -> SeatBroadcaster {
        SeatBroadcaster::new(&RealtimeConfig { channel_buffer: 4 })
    }

    fn update(event_id: EventId, status: SeatStatus) -> SeatUpdate {
        SeatUpdate::new(event_id, vec![SeatId::new()], status, Some(HolderId::new()))
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_update() {
        let bus = broadcaster();
        let event_id = EventId::new();
        let mut rx = bus.subscribe(event_id).await;

        bus.publish(update(event_id, SeatStatus::Locked)).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_id, event_id);
        assert_eq!(received.status, SeatStatus::Locked);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let bus = broadcaster();
        // Must not panic or error.
        bus.publish(update(EventId::new(), SeatStatus::Available))
            .await;
    }

    #[tokio::test]
    async fn test_events_are_isolated_per_channel() {
        let bus = broadcaster();
        let watched = EventId::new();
        let other = EventId::new();
        let mut rx = bus.subscribe(watched).await;

        bus.publish(update(other, SeatStatus::Booked)).await;
        bus.publish(update(watched, SeatStatus::Booked)).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_id, watched);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lagging_subscriber_does_not_block_publish() {
        let bus = broadcaster();
        let event_id = EventId::new();
        let mut rx = bus.subscribe(event_id).await;

        // Overrun the 4-slot buffer.
        for _ in 0..8 {
            bus.publish(update(event_id, SeatStatus::Locked)).await;
        }

        // The receiver observes the lag, then catches up.
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_buffer_config_still_delivers() {
        let bus = SeatBroadcaster::new(&RealtimeConfig { channel_buffer: 0 });
        let event_id = EventId::new();
        let mut rx = bus.subscribe(event_id).await;

        bus.publish(update(event_id, SeatStatus::Locked)).await;

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_receivers() {
        let bus = broadcaster();
        let event_id = EventId::new();
        assert_eq!(bus.subscriber_count(event_id).await, 0);

        let rx = bus.subscribe(event_id).await;
        assert_eq!(bus.subscriber_count(event_id).await, 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(event_id).await, 0);
    }
}
