use std::collections::HashMap;

use uuid::Uuid;

use aerodesk_core::codes;
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_catalog::{Aircraft, Flight, NewFlight, Seat};

use crate::models::{NewReservation, Reservation, ReservationPatch, ReservationStatus};
use crate::passenger::{NewPassenger, Passenger};
use crate::rules;
use crate::tickets::{Ticket, TicketStatus};

/// In-memory reservation engine.
///
/// Holds the whole catalog plus reservations and tickets in hash maps and
/// enforces every lifecycle rule: seat/aircraft consistency, the
/// one-confirmed-reservation-per-seat and one-active-reservation-per-passenger
/// invariants, seat state side effects and the ticket cascade. The Postgres
/// store implements the same rules over transactions; this ledger is the
/// reference the invariant tests run against, and what backs demo and
/// seeding tooling that has no database at hand.
#[derive(Default)]
pub struct ReservationLedger {
    aircraft: HashMap<Uuid, Aircraft>,
    seats: HashMap<Uuid, Seat>,
    flights: HashMap<Uuid, Flight>,
    passengers: HashMap<Uuid, Passenger>,
    reservations: HashMap<Uuid, Reservation>,
    tickets: HashMap<Uuid, Ticket>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn register_aircraft(
        &mut self,
        model: impl Into<String>,
        rows: i32,
        columns: i32,
    ) -> CoreResult<Aircraft> {
        let aircraft = Aircraft::new(model, rows, columns)?;
        for seat in aircraft.generate_seats() {
            self.seats.insert(seat.id, seat);
        }
        self.aircraft.insert(aircraft.id, aircraft.clone());
        Ok(aircraft)
    }

    pub fn add_flight(&mut self, spec: NewFlight) -> CoreResult<Flight> {
        let aircraft = self
            .aircraft
            .get(&spec.aircraft_id)
            .ok_or_else(|| CoreError::not_found("aircraft not found"))?;
        let flight = Flight::new(aircraft.id, spec)?;
        self.flights.insert(flight.id, flight.clone());
        Ok(flight)
    }

    pub fn add_passenger(&mut self, spec: NewPassenger) -> CoreResult<Passenger> {
        if self.passengers.values().any(|p| p.document == spec.document) {
            return Err(CoreError::validation(
                "a passenger with this document already exists",
            ));
        }
        if self.passengers.values().any(|p| p.email == spec.email) {
            return Err(CoreError::validation(
                "a passenger with this email already exists",
            ));
        }
        let passenger = Passenger {
            id: Uuid::new_v4(),
            user_id: spec.user_id,
            first_name: spec.first_name,
            last_name: spec.last_name,
            document_type: spec.document_type,
            document: spec.document,
            email: spec.email,
            phone: spec.phone,
            date_of_birth: spec.date_of_birth,
        };
        self.passengers.insert(passenger.id, passenger.clone());
        Ok(passenger)
    }

    pub fn flight(&self, id: Uuid) -> Option<&Flight> {
        self.flights.get(&id)
    }

    pub fn seat(&self, id: Uuid) -> Option<&Seat> {
        self.seats.get(&id)
    }

    /// Look a seat up by its display number within an aircraft.
    pub fn seat_by_number(&self, aircraft_id: Uuid, number: &str) -> Option<&Seat> {
        self.seats
            .values()
            .find(|s| s.aircraft_id == aircraft_id && s.number == number)
    }

    pub fn reservation(&self, id: Uuid) -> Option<&Reservation> {
        self.reservations.get(&id)
    }

    pub fn ticket(&self, id: Uuid) -> Option<&Ticket> {
        self.tickets.get(&id)
    }

    pub fn ticket_for_reservation(&self, reservation_id: Uuid) -> Option<&Ticket> {
        self.tickets
            .values()
            .find(|t| t.reservation_id == reservation_id)
    }

    /// Capacity minus confirmed reservations for the flight.
    pub fn available_seat_count(&self, flight_id: Uuid) -> CoreResult<i64> {
        let flight = self
            .flights
            .get(&flight_id)
            .ok_or_else(|| CoreError::not_found("flight not found"))?;
        let aircraft = self
            .aircraft
            .get(&flight.aircraft_id)
            .ok_or_else(|| CoreError::internal("flight references a missing aircraft"))?;
        let confirmed = self.confirmed_for_flight(flight_id);
        Ok(aerodesk_catalog::flight::available_seat_count(
            aircraft.capacity,
            confirmed,
        ))
    }

    pub fn passenger_reservations(&self, passenger_id: Uuid, active_only: bool) -> Vec<&Reservation> {
        self.reservations
            .values()
            .filter(|r| r.passenger_id == passenger_id)
            .filter(|r| !active_only || r.is_active())
            .collect()
    }

    // ------------------------------------------------------------------
    // Reservation lifecycle
    // ------------------------------------------------------------------

    pub fn create_reservation(&mut self, req: NewReservation) -> CoreResult<Reservation> {
        let flight = self
            .flights
            .get(&req.flight_id)
            .ok_or_else(|| CoreError::not_found("flight not found"))?
            .clone();
        if !self.passengers.contains_key(&req.passenger_id) {
            return Err(CoreError::not_found("passenger not found"));
        }
        let seat = self
            .seats
            .get(&req.seat_id)
            .ok_or_else(|| CoreError::not_found("seat not found"))?
            .clone();

        rules::check_seat_belongs_to_flight(&seat, &flight)?;
        rules::check_seat_unclaimed(self.confirmed_for_seat(flight.id, seat.id, None))?;
        rules::check_passenger_unbooked(self.active_for_passenger(flight.id, req.passenger_id))?;

        let code = codes::generate_reservation_code(|candidate| {
            self.reservations.values().any(|r| r.code == candidate)
        })?;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            flight_id: flight.id,
            passenger_id: req.passenger_id,
            seat_id: seat.id,
            code,
            status: req.status.unwrap_or(ReservationStatus::Pending),
            price_amount: req.price_amount.unwrap_or(flight.base_price_amount),
            created_at: chrono::Utc::now(),
        };

        if reservation.status == ReservationStatus::Confirmed {
            self.occupy_seat(reservation.seat_id);
        }
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    pub fn confirm_reservation(&mut self, id: Uuid) -> CoreResult<Reservation> {
        let mut reservation = self
            .reservations
            .get(&id)
            .ok_or_else(|| CoreError::not_found("reservation not found"))?
            .clone();
        // Another pending reservation on the same seat may have been
        // confirmed since this one was created.
        rules::check_seat_unclaimed(self.confirmed_for_seat(
            reservation.flight_id,
            reservation.seat_id,
            Some(reservation.id),
        ))?;
        reservation.confirm()?;
        self.occupy_seat(reservation.seat_id);
        self.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    pub fn cancel_reservation(&mut self, id: Uuid) -> CoreResult<Reservation> {
        let mut reservation = self
            .reservations
            .get(&id)
            .ok_or_else(|| CoreError::not_found("reservation not found"))?
            .clone();
        reservation.cancel()?;
        self.release_seat(reservation.seat_id);
        // Cascade: an issued (or used) ticket becomes void with the
        // cancellation; an already-void ticket is left alone.
        if let Some(ticket) = self
            .tickets
            .values_mut()
            .find(|t| t.reservation_id == id && t.status != TicketStatus::Void)
        {
            ticket.void()?;
        }
        self.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    pub fn update_reservation(&mut self, id: Uuid, patch: ReservationPatch) -> CoreResult<Reservation> {
        let mut reservation = self
            .reservations
            .get(&id)
            .ok_or_else(|| CoreError::not_found("reservation not found"))?
            .clone();
        if reservation.status == ReservationStatus::Cancelled {
            return Err(CoreError::validation(
                "a cancelled reservation cannot be updated",
            ));
        }

        if let Some(new_seat_id) = patch.seat_id {
            if rules::seat_actually_changes(reservation.seat_id, new_seat_id) {
                let flight = self
                    .flights
                    .get(&reservation.flight_id)
                    .ok_or_else(|| CoreError::internal("reservation references a missing flight"))?
                    .clone();
                let new_seat = self
                    .seats
                    .get(&new_seat_id)
                    .ok_or_else(|| CoreError::not_found("seat not found"))?
                    .clone();
                rules::check_seat_belongs_to_flight(&new_seat, &flight)?;
                rules::check_seat_unclaimed(self.confirmed_for_seat(
                    flight.id,
                    new_seat_id,
                    Some(reservation.id),
                ))?;

                if reservation.status == ReservationStatus::Confirmed {
                    self.release_seat(reservation.seat_id);
                    self.occupy_seat(new_seat_id);
                }
                reservation.seat_id = new_seat_id;
            }
        }

        if let Some(price) = patch.price_amount {
            reservation.price_amount = price;
        }

        if let Some(target) = patch.status {
            match target {
                ReservationStatus::Pending => {
                    if reservation.status != ReservationStatus::Pending {
                        return Err(CoreError::validation(
                            "a reservation cannot return to pending",
                        ));
                    }
                }
                ReservationStatus::Confirmed => {
                    rules::check_seat_unclaimed(self.confirmed_for_seat(
                        reservation.flight_id,
                        reservation.seat_id,
                        Some(reservation.id),
                    ))?;
                    reservation.confirm()?;
                    self.occupy_seat(reservation.seat_id);
                }
                ReservationStatus::Cancelled => {
                    self.reservations.insert(id, reservation);
                    return self.cancel_reservation(id);
                }
            }
        }

        self.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub fn issue_ticket(&mut self, reservation_id: Uuid) -> CoreResult<Ticket> {
        let reservation = self
            .reservations
            .get(&reservation_id)
            .ok_or_else(|| CoreError::not_found("reservation not found"))?;
        let already = self
            .tickets
            .values()
            .any(|t| t.reservation_id == reservation_id);
        let ticket = Ticket::issue_for(reservation, already)?;
        self.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    pub fn void_ticket(&mut self, id: Uuid) -> CoreResult<Ticket> {
        let ticket = self
            .tickets
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("ticket not found"))?;
        ticket.void()?;
        Ok(ticket.clone())
    }

    pub fn mark_ticket_used(&mut self, id: Uuid) -> CoreResult<Ticket> {
        let ticket = self
            .tickets
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("ticket not found"))?;
        ticket.mark_used()?;
        Ok(ticket.clone())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn confirmed_for_flight(&self, flight_id: Uuid) -> i64 {
        self.reservations
            .values()
            .filter(|r| r.flight_id == flight_id && r.status == ReservationStatus::Confirmed)
            .count() as i64
    }

    fn confirmed_for_seat(&self, flight_id: Uuid, seat_id: Uuid, exclude: Option<Uuid>) -> i64 {
        self.reservations
            .values()
            .filter(|r| {
                r.flight_id == flight_id
                    && r.seat_id == seat_id
                    && r.status == ReservationStatus::Confirmed
                    && Some(r.id) != exclude
            })
            .count() as i64
    }

    fn active_for_passenger(&self, flight_id: Uuid, passenger_id: Uuid) -> i64 {
        self.reservations
            .values()
            .filter(|r| r.flight_id == flight_id && r.passenger_id == passenger_id && r.is_active())
            .count() as i64
    }

    fn occupy_seat(&mut self, seat_id: Uuid) {
        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.occupy();
        }
    }

    fn release_seat(&mut self, seat_id: Uuid) {
        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerodesk_catalog::SeatState;
    use crate::passenger::DocumentType;
    use chrono::{Duration, Utc};

    struct Fixture {
        ledger: ReservationLedger,
        aircraft: Aircraft,
        flight: Flight,
        passenger: Passenger,
    }

    fn fixture() -> Fixture {
        let mut ledger = ReservationLedger::new();
        let aircraft = ledger.register_aircraft("E190", 3, 2).unwrap();
        let departure = Utc::now() + Duration::days(14);
        let flight = ledger
            .add_flight(NewFlight {
                aircraft_id: aircraft.id,
                origin: "EZE".to_string(),
                destination: "COR".to_string(),
                departure,
                arrival: departure + Duration::hours(2),
                base_price_amount: 100,
                status: None,
            })
            .unwrap();
        let passenger = ledger
            .add_passenger(NewPassenger {
                user_id: None,
                first_name: "Ana".to_string(),
                last_name: "Paz".to_string(),
                document_type: DocumentType::Dni,
                document: "30111222".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
                date_of_birth: None,
            })
            .unwrap();
        Fixture {
            ledger,
            aircraft,
            flight,
            passenger,
        }
    }

    fn second_passenger(ledger: &mut ReservationLedger) -> Passenger {
        ledger
            .add_passenger(NewPassenger {
                user_id: None,
                first_name: "Bruno".to_string(),
                last_name: "Sosa".to_string(),
                document_type: DocumentType::Passport,
                document: "AA998877".to_string(),
                email: "bruno@example.com".to_string(),
                phone: None,
                date_of_birth: None,
            })
            .unwrap()
    }

    fn assert_capacity_invariant(f: &Fixture) {
        let available = f.ledger.available_seat_count(f.flight.id).unwrap();
        let confirmed = f.ledger.confirmed_for_flight(f.flight.id);
        assert_eq!(available + confirmed, f.aircraft.capacity as i64);
    }

    #[test]
    fn test_fresh_flight_has_full_availability() {
        let f = fixture();
        assert_eq!(f.ledger.available_seat_count(f.flight.id).unwrap(), 6);
    }

    #[test]
    fn test_reservation_lifecycle_with_ticket_cascade() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();

        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.price_amount, 100);
        assert_eq!(reservation.code.len(), 8);
        // Pending reservations do not consume seats.
        assert_eq!(f.ledger.available_seat_count(f.flight.id).unwrap(), 6);

        f.ledger.confirm_reservation(reservation.id).unwrap();
        assert_eq!(f.ledger.seat(seat.id).unwrap().state, SeatState::Occupied);
        assert_eq!(f.ledger.available_seat_count(f.flight.id).unwrap(), 5);
        assert_capacity_invariant(&f);

        let ticket = f.ledger.issue_ticket(reservation.id).unwrap();
        assert_eq!(ticket.status, TicketStatus::Issued);

        f.ledger.cancel_reservation(reservation.id).unwrap();
        assert_eq!(f.ledger.seat(seat.id).unwrap().state, SeatState::Available);
        assert_eq!(
            f.ledger.ticket(ticket.id).unwrap().status,
            TicketStatus::Void
        );
        assert_eq!(f.ledger.available_seat_count(f.flight.id).unwrap(), 6);
        assert_capacity_invariant(&f);

        // Confirming the cancelled reservation is always rejected.
        assert!(matches!(
            f.ledger.confirm_reservation(reservation.id),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_seat_double_booking_rejected() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let first = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();
        assert_eq!(f.ledger.seat(seat.id).unwrap().state, SeatState::Occupied);

        let other = second_passenger(&mut f.ledger);
        let result = f.ledger.create_reservation(NewReservation {
            flight_id: f.flight.id,
            passenger_id: other.id,
            seat_id: seat.id,
            price_amount: None,
            status: Some(ReservationStatus::Confirmed),
        });
        match result {
            Err(CoreError::Validation(msg)) => {
                assert!(msg.contains("already reserved"), "unexpected message: {msg}")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(
            f.ledger.reservation(first.id).unwrap().status,
            ReservationStatus::Confirmed
        );
    }

    #[test]
    fn test_passenger_single_active_reservation_per_flight() {
        let mut f = fixture();
        let seat_a = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let seat_b = f.ledger.seat_by_number(f.aircraft.id, "1B").unwrap().clone();

        let first = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_a.id,
                price_amount: None,
                status: None,
            })
            .unwrap();

        // A second reservation on the same flight is rejected even though it
        // targets a different seat.
        assert!(f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_b.id,
                price_amount: None,
                status: None,
            })
            .is_err());

        // After cancelling, the passenger can book again.
        f.ledger.cancel_reservation(first.id).unwrap();
        assert!(f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_b.id,
                price_amount: None,
                status: None,
            })
            .is_ok());
    }

    #[test]
    fn test_confirming_a_seat_another_confirmation_holds_rejected() {
        let mut f = fixture();
        let other = second_passenger(&mut f.ledger);
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();

        // Two pending reservations may coexist on the same seat; only one of
        // them can ever be confirmed.
        let first = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();
        let second = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: other.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();

        f.ledger.confirm_reservation(first.id).unwrap();

        match f.ledger.confirm_reservation(second.id) {
            Err(CoreError::Validation(msg)) => {
                assert!(msg.contains("already reserved"), "unexpected message: {msg}")
            }
            result => panic!("expected validation error, got {result:?}"),
        }
        // The status-patch route is guarded the same way.
        assert!(matches!(
            f.ledger.update_reservation(
                second.id,
                ReservationPatch {
                    status: Some(ReservationStatus::Confirmed),
                    ..Default::default()
                },
            ),
            Err(CoreError::Validation(_))
        ));

        assert_eq!(
            f.ledger.reservation(second.id).unwrap().status,
            ReservationStatus::Pending
        );
        assert_eq!(f.ledger.confirmed_for_flight(f.flight.id), 1);
        assert_capacity_invariant(&f);
    }

    #[test]
    fn test_double_cancel_rejected_consistently() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "2A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();
        f.ledger.cancel_reservation(reservation.id).unwrap();
        for _ in 0..2 {
            assert!(matches!(
                f.ledger.cancel_reservation(reservation.id),
                Err(CoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_seat_reassignment() {
        let mut f = fixture();
        let seat_a = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let seat_b = f.ledger.seat_by_number(f.aircraft.id, "3B").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_a.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();

        let updated = f
            .ledger
            .update_reservation(
                reservation.id,
                ReservationPatch {
                    seat_id: Some(seat_b.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.seat_id, seat_b.id);
        assert_eq!(f.ledger.seat(seat_a.id).unwrap().state, SeatState::Available);
        assert_eq!(f.ledger.seat(seat_b.id).unwrap().state, SeatState::Occupied);
        assert_capacity_invariant(&f);
    }

    #[test]
    fn test_reassignment_to_taken_seat_rejected() {
        let mut f = fixture();
        let other = second_passenger(&mut f.ledger);
        let seat_a = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let seat_b = f.ledger.seat_by_number(f.aircraft.id, "1B").unwrap().clone();

        f.ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: other.id,
                seat_id: seat_b.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();
        let mine = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_a.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();

        assert!(f
            .ledger
            .update_reservation(
                mine.id,
                ReservationPatch {
                    seat_id: Some(seat_b.id),
                    ..Default::default()
                },
            )
            .is_err());

        // Reassigning to its own seat is a no-op, not a conflict.
        assert!(f
            .ledger
            .update_reservation(
                mine.id,
                ReservationPatch {
                    seat_id: Some(seat_a.id),
                    ..Default::default()
                },
            )
            .is_ok());
    }

    #[test]
    fn test_reassignment_rejects_foreign_aircraft_seat() {
        let mut f = fixture();
        let other_aircraft = f.ledger.register_aircraft("A320", 12, 6).unwrap();
        let foreign_seat = f
            .ledger
            .seat_by_number(other_aircraft.id, "1A")
            .unwrap()
            .clone();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();

        let result = f.ledger.update_reservation(
            reservation.id,
            ReservationPatch {
                seat_id: Some(foreign_seat.id),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_update_cannot_return_to_pending() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();
        let result = f.ledger.update_reservation(
            reservation.id,
            ReservationPatch {
                status: Some(ReservationStatus::Pending),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_update_status_cancel_cascades() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: Some(ReservationStatus::Confirmed),
            })
            .unwrap();
        let ticket = f.ledger.issue_ticket(reservation.id).unwrap();

        f.ledger
            .update_reservation(
                reservation.id,
                ReservationPatch {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            f.ledger.ticket(ticket.id).unwrap().status,
            TicketStatus::Void
        );
        assert_eq!(f.ledger.seat(seat.id).unwrap().state, SeatState::Available);
    }

    #[test]
    fn test_missing_references_are_not_found() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let missing = Uuid::new_v4();

        let by_flight = f.ledger.create_reservation(NewReservation {
            flight_id: missing,
            passenger_id: f.passenger.id,
            seat_id: seat.id,
            price_amount: None,
            status: None,
        });
        assert!(matches!(by_flight, Err(CoreError::NotFound(_))));

        let by_seat = f.ledger.create_reservation(NewReservation {
            flight_id: f.flight.id,
            passenger_id: f.passenger.id,
            seat_id: missing,
            price_amount: None,
            status: None,
        });
        assert!(matches!(by_seat, Err(CoreError::NotFound(_))));

        assert!(matches!(
            f.ledger.confirm_reservation(missing),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            f.ledger.issue_ticket(missing),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_ticket_requires_confirmed_reservation() {
        let mut f = fixture();
        let seat = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat.id,
                price_amount: None,
                status: None,
            })
            .unwrap();
        assert!(f.ledger.issue_ticket(reservation.id).is_err());

        f.ledger.confirm_reservation(reservation.id).unwrap();
        let ticket = f.ledger.issue_ticket(reservation.id).unwrap();
        // One ticket per reservation.
        assert!(f.ledger.issue_ticket(reservation.id).is_err());

        f.ledger.mark_ticket_used(ticket.id).unwrap();
        assert!(f.ledger.mark_ticket_used(ticket.id).is_err());
    }

    #[test]
    fn test_duplicate_passenger_identity_rejected() {
        let mut f = fixture();
        let dup_document = f.ledger.add_passenger(NewPassenger {
            user_id: None,
            first_name: "Copy".to_string(),
            last_name: "Cat".to_string(),
            document_type: DocumentType::Dni,
            document: "30111222".to_string(),
            email: "other@example.com".to_string(),
            phone: None,
            date_of_birth: None,
        });
        assert!(dup_document.is_err());

        let dup_email = f.ledger.add_passenger(NewPassenger {
            user_id: None,
            first_name: "Copy".to_string(),
            last_name: "Cat".to_string(),
            document_type: DocumentType::Dni,
            document: "99887766".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            date_of_birth: None,
        });
        assert!(dup_email.is_err());
    }

    #[test]
    fn test_reservation_listing_by_passenger() {
        let mut f = fixture();
        let seat_a = f.ledger.seat_by_number(f.aircraft.id, "1A").unwrap().clone();
        let reservation = f
            .ledger
            .create_reservation(NewReservation {
                flight_id: f.flight.id,
                passenger_id: f.passenger.id,
                seat_id: seat_a.id,
                price_amount: None,
                status: None,
            })
            .unwrap();
        f.ledger.cancel_reservation(reservation.id).unwrap();

        assert_eq!(f.ledger.passenger_reservations(f.passenger.id, false).len(), 1);
        assert_eq!(f.ledger.passenger_reservations(f.passenger.id, true).len(), 0);
    }
}
