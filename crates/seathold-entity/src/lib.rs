//! # seathold-entity
//!
//! Persistent entity models for the Seathold reservation engine: seats,
//! holds, and the durable expiry queue. Models derive `sqlx::FromRow` and
//! carry the pure predicates the engine's transition decisions are built
//! from.

pub mod expiry;
pub mod hold;
pub mod seat;
