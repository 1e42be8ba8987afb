pub mod aircraft;
pub mod flight;
pub mod seat;

pub use aircraft::{Aircraft, AircraftPatch};
pub use flight::{available_seat_count, Flight, FlightFilter, FlightPatch, FlightStatus, NewFlight};
pub use seat::{Seat, SeatClass, SeatState};
