//! Trait seams consumed across crates.

pub mod notifier;

pub use notifier::SeatNotifier;
