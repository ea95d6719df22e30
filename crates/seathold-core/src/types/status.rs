//! Seat status enumeration.
//!
//! Modeled as a closed enum with exhaustive matching at every transition
//! site rather than free-form strings compared ad hoc. The database stores
//! it as the `seat_status` Postgres enum type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The lifecycle status of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "seat_status", rename_all = "snake_case"))]
pub enum SeatStatus {
    /// The seat can be acquired by any holder.
    Available,
    /// The seat is exclusively held by one holder pending checkout.
    Locked,
    /// The seat is permanently sold and linked to a booking.
    Booked,
    /// The seat is set aside by an administrative action (e.g. box office).
    Reserved,
    /// The seat cannot be sold (blocked view, broken, house seat).
    Unavailable,
}

impl SeatStatus {
    /// The stable lowercase string form stored in the database and
    /// broadcast to live clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Locked => "locked",
            Self::Booked => "booked",
            Self::Reserved => "reserved",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "locked" => Ok(Self::Locked),
            "booked" => Ok(Self::Booked),
            "reserved" => Ok(Self::Reserved),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(AppError::validation(format!(
                "Unknown seat status: '{other}'"
            ))),
        }
    }
}
