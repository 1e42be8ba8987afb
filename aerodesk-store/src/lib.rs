pub mod app_config;
pub mod database;
pub mod fleet_repo;
pub mod flight_repo;
pub mod notify;
pub mod passenger_repo;
pub mod reservation_repo;
pub(crate) mod rows;
pub mod ticket_repo;

pub use database::DbClient;
pub use fleet_repo::AircraftRepository;
pub use flight_repo::{FlightRepository, ManifestEntry, SeatMapEntry};
pub use notify::LogTicketNotifier;
pub use passenger_repo::PassengerRepository;
pub use reservation_repo::ReservationRepository;
pub use ticket_repo::TicketRepository;

use aerodesk_core::CoreError;

pub(crate) fn db_err(err: sqlx::Error) -> CoreError {
    CoreError::Internal(err.to_string())
}

/// Translate a unique-index violation into the business conflict the caller
/// raced against. Two requests can both pass the advisory check; the partial
/// unique index rejects the second write and the raw storage error must not
/// leak.
pub(crate) fn unique_conflict(err: sqlx::Error, msg: &str) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return CoreError::Conflict(msg.to_string());
        }
    }
    db_err(err)
}
