//! In-process registry of deferred release timers.
//!
//! One cancellable timer per hold, keyed by hold id. Strictly a cache for
//! low-latency release while the process is alive: the durable expiry
//! queue remains the source of truth, so losing every timer on a crash
//! only delays release until the next sweep pass.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use seathold_core::types::id::HoldId;

struct TimerSlot {
    /// Distinguishes a timer from its replacement so a finished task only
    /// removes its own registration.
    generation: u64,
    handle: JoinHandle<()>,
}

/// Per-process registry of cancellable deferred tasks keyed by hold id.
#[derive(Clone, Default)]
pub struct TimerRegistry {
    slots: Arc<DashMap<HoldId, TimerSlot>>,
    seq: Arc<AtomicU64>,
}

impl std::fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("pending", &self.slots.len())
            .finish()
    }
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run after `delay`, replacing (and aborting) any
    /// timer already registered for this hold.
    pub fn schedule<F>(&self, hold_id: HoldId, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.seq.fetch_add(1, Ordering::Relaxed);
        let slots = Arc::clone(&self.slots);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            slots.remove_if(&hold_id, |_, slot| slot.generation == generation);
        });

        if let Some(previous) = self.slots.insert(hold_id, TimerSlot { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Cancel the timer for a hold, if one is pending. Returns whether a
    /// timer was cancelled.
    pub fn cancel(&self, hold_id: HoldId) -> bool {
        match self.slots.remove(&hold_id) {
            Some((_, slot)) => {
                slot.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of timers currently registered.
    pub fn pending(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_once_and_deregisters() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_in = Arc::clone(&fired);
        let hold_id = HoldId::new();

        registry.schedule(hold_id, Duration::from_secs(5), async move {
            fired_in.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.pending(), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_in = Arc::clone(&fired);
        let hold_id = HoldId::new();

        registry.schedule(hold_id, Duration::from_secs(5), async move {
            fired_in.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.cancel(hold_id));
        assert!(!registry.cancel(hold_id));

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous_timer() {
        let registry = TimerRegistry::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let hold_id = HoldId::new();

        let first_in = Arc::clone(&first);
        registry.schedule(hold_id, Duration::from_secs(5), async move {
            first_in.fetch_add(1, Ordering::SeqCst);
        });

        let second_in = Arc::clone(&second);
        registry.schedule(hold_id, Duration::from_secs(8), async move {
            second_in.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.pending(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_for_different_holds_are_independent() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        let a = HoldId::new();
        let b = HoldId::new();

        let fired_a = Arc::clone(&fired);
        registry.schedule(a, Duration::from_secs(5), async move {
            fired_a.fetch_add(1, Ordering::SeqCst);
        });
        let fired_b = Arc::clone(&fired);
        registry.schedule(b, Duration::from_secs(5), async move {
            fired_b.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.cancel(a));
        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
