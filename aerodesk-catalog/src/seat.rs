use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};

/// Cabin tier, assigned from the seat row at grid generation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    First,
    Business,
    Economy,
}

/// Row thresholds for the tier table. Rows 1..=3 are first class,
/// 4..=10 business, everything above economy.
pub const FIRST_CLASS_MAX_ROW: i32 = 3;
pub const BUSINESS_CLASS_MAX_ROW: i32 = 10;

impl SeatClass {
    pub fn from_row(row: i32) -> Self {
        if row <= FIRST_CLASS_MAX_ROW {
            SeatClass::First
        } else if row <= BUSINESS_CLASS_MAX_ROW {
            SeatClass::Business
        } else {
            SeatClass::Economy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::First => "FIRST",
            SeatClass::Business => "BUSINESS",
            SeatClass::Economy => "ECONOMY",
        }
    }
}

impl std::str::FromStr for SeatClass {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "FIRST" => Ok(SeatClass::First),
            "BUSINESS" => Ok(SeatClass::Business),
            "ECONOMY" => Ok(SeatClass::Economy),
            other => Err(CoreError::internal(format!("unknown seat class: {other}"))),
        }
    }
}

/// Aircraft-level seat lifecycle state. Per-flight occupancy is derived from
/// confirmed reservations, not from this field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Available,
    Reserved,
    Occupied,
    Maintenance,
}

impl SeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatState::Available => "AVAILABLE",
            SeatState::Reserved => "RESERVED",
            SeatState::Occupied => "OCCUPIED",
            SeatState::Maintenance => "MAINTENANCE",
        }
    }
}

impl std::str::FromStr for SeatState {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "AVAILABLE" => Ok(SeatState::Available),
            "RESERVED" => Ok(SeatState::Reserved),
            "OCCUPIED" => Ok(SeatState::Occupied),
            "MAINTENANCE" => Ok(SeatState::Maintenance),
            other => Err(CoreError::internal(format!("unknown seat state: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub aircraft_id: Uuid,
    /// Display number, e.g. "12C".
    pub number: String,
    pub row: i32,
    pub column: char,
    pub class: SeatClass,
    pub state: SeatState,
}

impl Seat {
    /// Mark the seat held by a confirmed reservation.
    pub fn occupy(&mut self) {
        self.state = SeatState::Occupied;
    }

    /// Release the seat back to the pool. Seats pulled for maintenance stay
    /// in maintenance until an operator clears them.
    pub fn release(&mut self) {
        if self.state != SeatState::Maintenance {
            self.state = SeatState::Available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(state: SeatState) -> Seat {
        Seat {
            id: Uuid::new_v4(),
            aircraft_id: Uuid::new_v4(),
            number: "1A".to_string(),
            row: 1,
            column: 'A',
            class: SeatClass::First,
            state,
        }
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(SeatClass::from_row(1), SeatClass::First);
        assert_eq!(SeatClass::from_row(3), SeatClass::First);
        assert_eq!(SeatClass::from_row(4), SeatClass::Business);
        assert_eq!(SeatClass::from_row(10), SeatClass::Business);
        assert_eq!(SeatClass::from_row(11), SeatClass::Economy);
    }

    #[test]
    fn test_occupy_and_release() {
        let mut s = seat(SeatState::Available);
        s.occupy();
        assert_eq!(s.state, SeatState::Occupied);
        s.release();
        assert_eq!(s.state, SeatState::Available);
    }

    #[test]
    fn test_release_keeps_maintenance() {
        let mut s = seat(SeatState::Maintenance);
        s.release();
        assert_eq!(s.state, SeatState::Maintenance);
    }
}
