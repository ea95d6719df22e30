//! Hold entity.

pub mod model;
pub mod status;

pub use model::Hold;
pub use status::HoldStatus;
