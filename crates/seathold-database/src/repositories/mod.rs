//! Repository implementations.
//!
//! Read paths take the pool directly; every mutating method takes an open
//! transaction so the engine controls commit boundaries and the row locks
//! taken inside them.

pub mod expiry;
pub mod hold;
pub mod seat;

pub use expiry::ExpiryRepository;
pub use hold::HoldRepository;
pub use seat::SeatRepository;
