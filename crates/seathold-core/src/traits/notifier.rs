//! Notifier trait for broadcasting seat-state transitions.

use async_trait::async_trait;

use crate::events::SeatUpdate;

/// Fan-out of seat-state transitions to live subscribers.
///
/// Publishing is fire-and-forget: implementations must never fail the
/// caller. State changes are committed before publishing is attempted, so
/// a delivery failure cannot invalidate anything; it is logged and
/// dropped.
#[async_trait]
pub trait SeatNotifier: Send + Sync + 'static {
    /// Broadcast one seat-state transition to subscribers of its event.
    async fn publish(&self, update: SeatUpdate);
}

/// A notifier that discards every update.
///
/// Used by deployments that run only the sweep, and by tests that do not
/// assert on notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl SeatNotifier for NoopNotifier {
    async fn publish(&self, _update: SeatUpdate) {}
}
