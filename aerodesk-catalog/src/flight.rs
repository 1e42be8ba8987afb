use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    InProgress,
    Landed,
    Cancelled,
    Delayed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::InProgress => "IN_PROGRESS",
            FlightStatus::Landed => "LANDED",
            FlightStatus::Cancelled => "CANCELLED",
            FlightStatus::Delayed => "DELAYED",
        }
    }
}

impl std::str::FromStr for FlightStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "SCHEDULED" => Ok(FlightStatus::Scheduled),
            "IN_PROGRESS" => Ok(FlightStatus::InProgress),
            "LANDED" => Ok(FlightStatus::Landed),
            "CANCELLED" => Ok(FlightStatus::Cancelled),
            "DELAYED" => Ok(FlightStatus::Delayed),
            other => Err(CoreError::internal(format!(
                "unknown flight status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub aircraft_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub status: FlightStatus,
    pub base_price_amount: i32,
}

impl Flight {
    pub fn new(aircraft_id: Uuid, spec: NewFlight) -> CoreResult<Self> {
        validate_schedule(spec.departure, spec.arrival)?;
        Ok(Flight {
            id: Uuid::new_v4(),
            aircraft_id,
            origin: spec.origin,
            destination: spec.destination,
            departure: spec.departure,
            arrival: spec.arrival,
            status: spec.status.unwrap_or(FlightStatus::Scheduled),
            base_price_amount: spec.base_price_amount,
        })
    }

    /// Derived, never stored.
    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub aircraft_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub base_price_amount: i32,
    pub status: Option<FlightStatus>,
}

/// Updatable flight fields. Unknown keys are rejected by serde at the
/// API boundary rather than written blindly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightPatch {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<DateTime<Utc>>,
    pub arrival: Option<DateTime<Utc>>,
    pub status: Option<FlightStatus>,
    pub base_price_amount: Option<i32>,
}

impl FlightPatch {
    /// Apply the patch to an existing flight, re-validating the schedule with
    /// the combined departure/arrival pair.
    pub fn apply(self, flight: &mut Flight) -> CoreResult<()> {
        let departure = self.departure.unwrap_or(flight.departure);
        let arrival = self.arrival.unwrap_or(flight.arrival);
        validate_schedule(departure, arrival)?;

        if let Some(origin) = self.origin {
            flight.origin = origin;
        }
        if let Some(destination) = self.destination {
            flight.destination = destination;
        }
        flight.departure = departure;
        flight.arrival = arrival;
        if let Some(status) = self.status {
            flight.status = status;
        }
        if let Some(price) = self.base_price_amount {
            flight.base_price_amount = price;
        }
        Ok(())
    }
}

/// Listing filter, all criteria optional and combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<FlightStatus>,
}

pub fn validate_schedule(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> CoreResult<()> {
    if arrival <= departure {
        return Err(CoreError::validation(
            "arrival must be strictly after departure",
        ));
    }
    Ok(())
}

/// Available seats for a flight: aircraft capacity minus its confirmed
/// reservations. Cancelled and pending reservations do not consume seats.
pub fn available_seat_count(capacity: i32, confirmed_reservations: i64) -> i64 {
    capacity as i64 - confirmed_reservations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times() -> (DateTime<Utc>, DateTime<Utc>) {
        let dep = Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap();
        let arr = Utc.with_ymd_and_hms(2026, 9, 1, 12, 30, 0).unwrap();
        (dep, arr)
    }

    #[test]
    fn test_schedule_must_be_ordered() {
        let (dep, arr) = times();
        assert!(validate_schedule(dep, arr).is_ok());
        assert!(validate_schedule(arr, dep).is_err());
        // Equal timestamps are invalid too.
        assert!(validate_schedule(dep, dep).is_err());
    }

    #[test]
    fn test_duration_is_derived() {
        let (dep, arr) = times();
        let flight = Flight::new(
            Uuid::new_v4(),
            NewFlight {
                aircraft_id: Uuid::new_v4(),
                origin: "EZE".to_string(),
                destination: "AEP".to_string(),
                departure: dep,
                arrival: arr,
                base_price_amount: 100,
                status: None,
            },
        )
        .unwrap();
        assert_eq!(flight.duration(), Duration::minutes(150));
        assert_eq!(flight.status, FlightStatus::Scheduled);
    }

    #[test]
    fn test_patch_revalidates_schedule() {
        let (dep, arr) = times();
        let mut flight = Flight::new(
            Uuid::new_v4(),
            NewFlight {
                aircraft_id: Uuid::new_v4(),
                origin: "EZE".to_string(),
                destination: "AEP".to_string(),
                departure: dep,
                arrival: arr,
                base_price_amount: 100,
                status: None,
            },
        )
        .unwrap();

        let bad = FlightPatch {
            arrival: Some(dep - Duration::hours(1)),
            ..Default::default()
        };
        assert!(bad.apply(&mut flight).is_err());

        let good = FlightPatch {
            status: Some(FlightStatus::Delayed),
            base_price_amount: Some(140),
            ..Default::default()
        };
        good.apply(&mut flight).unwrap();
        assert_eq!(flight.status, FlightStatus::Delayed);
        assert_eq!(flight.base_price_amount, 140);
    }

    #[test]
    fn test_available_seat_count() {
        assert_eq!(available_seat_count(6, 0), 6);
        assert_eq!(available_seat_count(6, 1), 5);
        assert_eq!(available_seat_count(6, 6), 0);
    }
}
