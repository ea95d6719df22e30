//! # seathold-engine
//!
//! The seat reservation engine proper: the lock manager (acquire/release),
//! inventory reads, the booking finalizer, the expiry release path with
//! bounded retry, and the in-process registry of deferred release timers.
//!
//! All mutual exclusion comes from row locks taken inside database
//! transactions; nothing in this crate keeps correctness-relevant state in
//! memory. The timer registry is a latency optimization whose loss on
//! crash is covered by the durable sweep.

pub mod expiry;
pub mod finalize;
pub mod inventory;
pub mod lock;
mod notify;
pub mod retry;
pub mod timers;

pub use expiry::{ExpiredRelease, ExpiryService};
pub use finalize::{BookingFinalizer, FinalizeOutcome};
pub use inventory::Inventory;
pub use lock::{AcquireOutcome, LockManager};
pub use retry::RetryPolicy;
pub use timers::TimerRegistry;
