//! Hold status enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use seathold_core::error::AppError;

/// The lifecycle status of a hold.
///
/// `Pending` is the only active state. The other three are terminal: once
/// a hold leaves `Pending` it is never mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "hold_status", rename_all = "snake_case")]
pub enum HoldStatus {
    /// Seats are locked, awaiting finalize or expiry.
    Pending,
    /// Converted into a booking.
    Confirmed,
    /// Deadline passed without finalize; seats were returned.
    Expired,
    /// Explicitly released by the holder.
    Released,
}

impl HoldStatus {
    /// The stable lowercase string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Expired => "expired",
            Self::Released => "released",
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "expired" => Ok(Self::Expired),
            "released" => Ok(Self::Released),
            other => Err(AppError::validation(format!(
                "Unknown hold status: '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!HoldStatus::Pending.is_terminal());
        assert!(HoldStatus::Confirmed.is_terminal());
        assert!(HoldStatus::Expired.is_terminal());
        assert!(HoldStatus::Released.is_terminal());
    }

    #[test]
    fn test_string_round_trip() {
        for status in [
            HoldStatus::Pending,
            HoldStatus::Confirmed,
            HoldStatus::Expired,
            HoldStatus::Released,
        ] {
            assert_eq!(status, status.as_str().parse().unwrap());
        }
    }
}
