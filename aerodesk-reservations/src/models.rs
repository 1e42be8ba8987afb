use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};

/// Reservation state machine: pending -> confirmed -> cancelled, or
/// pending -> cancelled. Nothing ever re-enters pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(CoreError::internal(format!(
                "unknown reservation status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub passenger_id: Uuid,
    pub seat_id: Uuid,
    /// Customer-facing lookup code, 8 uppercase alphanumerics, unique.
    pub code: String,
    pub status: ReservationStatus,
    pub price_amount: i32,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// pending -> confirmed. The caller must occupy the seat in the same
    /// transaction.
    pub fn confirm(&mut self) -> CoreResult<()> {
        match self.status {
            ReservationStatus::Confirmed => {
                Err(CoreError::validation("the reservation is already confirmed"))
            }
            ReservationStatus::Cancelled => Err(CoreError::validation(
                "a cancelled reservation cannot be confirmed",
            )),
            ReservationStatus::Pending => {
                self.status = ReservationStatus::Confirmed;
                Ok(())
            }
        }
    }

    /// pending/confirmed -> cancelled. The caller must release the seat and
    /// void any issued ticket in the same transaction.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.status == ReservationStatus::Cancelled {
            return Err(CoreError::validation("the reservation is already cancelled"));
        }
        self.status = ReservationStatus::Cancelled;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub flight_id: Uuid,
    pub passenger_id: Uuid,
    pub seat_id: Uuid,
    /// Defaults to the flight's base price.
    pub price_amount: Option<i32>,
    /// Defaults to pending. A caller-supplied CONFIRMED occupies the seat
    /// as part of the creating transaction.
    pub status: Option<ReservationStatus>,
}

/// The enumerated set of updatable reservation fields. Status changes route
/// through the confirm/cancel transitions so seat state cannot diverge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPatch {
    pub seat_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub price_amount: Option<i32>,
}
