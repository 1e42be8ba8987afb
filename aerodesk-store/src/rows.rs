//! Internal row structs for type-safe querying, converted into the domain
//! types at the repository boundary.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use aerodesk_catalog::{Aircraft, Flight, FlightStatus, Seat, SeatClass, SeatState};
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_reservations::{
    DocumentType, Passenger, Reservation, ReservationStatus, Ticket, TicketStatus,
};

#[derive(FromRow)]
pub(crate) struct AircraftRow {
    pub id: Uuid,
    pub model: String,
    pub seat_rows: i32,
    pub seat_columns: i32,
    pub capacity: i32,
}

impl AircraftRow {
    pub fn into_aircraft(self) -> Aircraft {
        Aircraft {
            id: self.id,
            model: self.model,
            rows: self.seat_rows,
            columns: self.seat_columns,
            capacity: self.capacity,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct SeatRow {
    pub id: Uuid,
    pub aircraft_id: Uuid,
    pub number: String,
    pub seat_row: i32,
    pub seat_column: String,
    pub class: String,
    pub state: String,
}

impl SeatRow {
    pub fn into_seat(self) -> CoreResult<Seat> {
        let column = self
            .seat_column
            .chars()
            .next()
            .ok_or_else(|| CoreError::internal("seat row with empty column letter"))?;
        Ok(Seat {
            id: self.id,
            aircraft_id: self.aircraft_id,
            number: self.number,
            row: self.seat_row,
            column,
            class: SeatClass::from_str(&self.class)?,
            state: SeatState::from_str(&self.state)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct FlightRow {
    pub id: Uuid,
    pub aircraft_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub status: String,
    pub base_price_amount: i32,
}

impl FlightRow {
    pub fn into_flight(self) -> CoreResult<Flight> {
        Ok(Flight {
            id: self.id,
            aircraft_id: self.aircraft_id,
            origin: self.origin,
            destination: self.destination,
            departure: self.departure,
            arrival: self.arrival,
            status: FlightStatus::from_str(&self.status)?,
            base_price_amount: self.base_price_amount,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct PassengerRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl PassengerRow {
    pub fn into_passenger(self) -> CoreResult<Passenger> {
        Ok(Passenger {
            id: self.id,
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            document_type: DocumentType::from_str(&self.document_type)?,
            document: self.document,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub passenger_id: Uuid,
    pub seat_id: Uuid,
    pub code: String,
    pub status: String,
    pub price_amount: i32,
    pub created_at: DateTime<Utc>,
}

impl ReservationRow {
    pub fn into_reservation(self) -> CoreResult<Reservation> {
        Ok(Reservation {
            id: self.id,
            flight_id: self.flight_id,
            passenger_id: self.passenger_id,
            seat_id: self.seat_id,
            code: self.code,
            status: ReservationStatus::from_str(&self.status)?,
            price_amount: self.price_amount,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub barcode: String,
    pub issued_at: DateTime<Utc>,
    pub status: String,
}

impl TicketRow {
    pub fn into_ticket(self) -> CoreResult<Ticket> {
        Ok(Ticket {
            id: self.id,
            reservation_id: self.reservation_id,
            barcode: self.barcode,
            issued_at: self.issued_at,
            status: TicketStatus::from_str(&self.status)?,
        })
    }
}
