pub mod engine;
pub mod models;
pub mod passenger;
pub mod rules;
pub mod tickets;

pub use engine::ReservationLedger;
pub use models::{NewReservation, Reservation, ReservationPatch, ReservationStatus};
pub use passenger::{DocumentType, NewPassenger, Passenger, PassengerPatch};
pub use tickets::{Ticket, TicketStatus};
