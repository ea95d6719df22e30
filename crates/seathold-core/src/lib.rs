//! # seathold-core
//!
//! Core crate for the Seathold reservation engine. Contains configuration
//! schemas, typed identifiers, the seat status enumeration, seat-update
//! events, the notifier trait seam, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Seathold crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
