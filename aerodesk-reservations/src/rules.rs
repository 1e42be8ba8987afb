use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};
use aerodesk_catalog::{Flight, Seat};

/// The seat must belong to the aircraft operating the flight.
pub fn check_seat_belongs_to_flight(seat: &Seat, flight: &Flight) -> CoreResult<()> {
    if seat.aircraft_id != flight.aircraft_id {
        return Err(CoreError::validation(
            "the seat does not belong to this flight's aircraft",
        ));
    }
    Ok(())
}

/// At most one confirmed reservation per (flight, seat). The count the
/// caller supplies must come from the same transactional view the insert
/// will run under; the partial unique index is the race-safety backstop.
pub fn check_seat_unclaimed(confirmed_for_seat: i64) -> CoreResult<()> {
    if confirmed_for_seat > 0 {
        return Err(CoreError::validation(
            "the seat is already reserved for this flight",
        ));
    }
    Ok(())
}

/// At most one non-cancelled reservation per (flight, passenger).
pub fn check_passenger_unbooked(active_for_passenger: i64) -> CoreResult<()> {
    if active_for_passenger > 0 {
        return Err(CoreError::validation(
            "the passenger already has a reservation on this flight",
        ));
    }
    Ok(())
}

/// Seat reassignment target must differ from the current seat; reassigning
/// to the reservation's own seat is a no-op the caller short-circuits.
pub fn seat_actually_changes(current_seat: Uuid, requested_seat: Uuid) -> bool {
    current_seat != requested_seat
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerodesk_catalog::{Aircraft, NewFlight};
    use chrono::{Duration, Utc};

    fn fixture() -> (Aircraft, Flight, Seat) {
        let aircraft = Aircraft::new("E190", 3, 2).unwrap();
        let seat = aircraft.generate_seats().remove(0);
        let departure = Utc::now() + Duration::days(7);
        let flight = Flight::new(
            aircraft.id,
            NewFlight {
                aircraft_id: aircraft.id,
                origin: "EZE".to_string(),
                destination: "COR".to_string(),
                departure,
                arrival: departure + Duration::hours(2),
                base_price_amount: 100,
                status: None,
            },
        )
        .unwrap();
        (aircraft, flight, seat)
    }

    #[test]
    fn test_seat_aircraft_match() {
        let (_aircraft, flight, seat) = fixture();
        assert!(check_seat_belongs_to_flight(&seat, &flight).is_ok());

        let other = Aircraft::new("A320", 12, 6).unwrap();
        let foreign_seat = other.generate_seats().remove(0);
        assert!(matches!(
            check_seat_belongs_to_flight(&foreign_seat, &flight),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_double_booking_checks() {
        assert!(check_seat_unclaimed(0).is_ok());
        assert!(check_seat_unclaimed(1).is_err());
        assert!(check_passenger_unbooked(0).is_ok());
        assert!(check_passenger_unbooked(2).is_err());
    }
}
