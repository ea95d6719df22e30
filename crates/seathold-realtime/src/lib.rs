//! # seathold-realtime
//!
//! Fan-out of seat-state transitions to live subscribers (browsers
//! viewing the same seat map). Delivery is at-least-once and
//! fire-and-forget: a failure to deliver never fails or rolls back the
//! state transition that triggered it.

pub mod pubsub;

pub use pubsub::SeatBroadcaster;
