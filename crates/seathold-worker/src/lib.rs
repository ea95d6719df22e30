//! # seathold-worker
//!
//! The durable expiry sweep: a periodic task that scans the expiry queue
//! for lapsed holds and releases them. This loop, not the in-process
//! timers, is what guarantees every hold is eventually released across
//! process restarts, so it may run in a different process than the one
//! that created the hold.

pub mod sweeper;

pub use sweeper::SweepRunner;
