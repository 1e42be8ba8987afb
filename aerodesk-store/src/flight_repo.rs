use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use aerodesk_catalog::{available_seat_count, Flight, FlightFilter, FlightPatch, NewFlight, Seat};
use aerodesk_core::{CoreError, CoreResult};

use crate::rows::{FlightRow, SeatRow};
use crate::{db_err, DbClient};

/// One seat of a flight's aircraft with its confirmed occupant, if any.
#[derive(Debug, Serialize)]
pub struct SeatMapEntry {
    pub seat: Seat,
    pub occupied: bool,
    pub reservation_id: Option<Uuid>,
    pub passenger_id: Option<Uuid>,
}

/// One confirmed reservation on a flight, flattened for boarding lists.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ManifestEntry {
    pub code: String,
    pub seat_number: String,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: String,
    pub email: String,
}

#[derive(sqlx::FromRow)]
struct SeatMapRow {
    id: Uuid,
    aircraft_id: Uuid,
    number: String,
    seat_row: i32,
    seat_column: String,
    class: String,
    state: String,
    reservation_id: Option<Uuid>,
    passenger_id: Option<Uuid>,
}

pub struct FlightRepository;

impl FlightRepository {
    pub async fn create(db: &DbClient, spec: NewFlight) -> CoreResult<Flight> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM aircraft WHERE id = $1)")
                .bind(spec.aircraft_id)
                .fetch_one(&db.pool)
                .await
                .map_err(db_err)?;
        if !exists {
            return Err(CoreError::not_found("aircraft not found"));
        }

        let aircraft_id = spec.aircraft_id;
        let flight = Flight::new(aircraft_id, spec)?;

        sqlx::query(
            "INSERT INTO flights (id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(flight.id)
        .bind(flight.aircraft_id)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure)
        .bind(flight.arrival)
        .bind(flight.status.as_str())
        .bind(flight.base_price_amount)
        .execute(&db.pool)
        .await
        .map_err(db_err)?;

        info!(
            flight_id = %flight.id,
            origin = %flight.origin,
            destination = %flight.destination,
            "Flight scheduled"
        );
        Ok(flight)
    }

    pub async fn get(db: &DbClient, id: Uuid) -> CoreResult<Flight> {
        let row: Option<FlightRow> = sqlx::query_as(
            "SELECT id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount
             FROM flights WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("flight not found"))?
            .into_flight()
    }

    pub async fn list(db: &DbClient, filter: FlightFilter) -> CoreResult<Vec<Flight>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount
             FROM flights WHERE 1 = 1",
        );
        if let Some(origin) = &filter.origin {
            qb.push(" AND origin = ").push_bind(origin.clone());
        }
        if let Some(destination) = &filter.destination {
            qb.push(" AND destination = ").push_bind(destination.clone());
        }
        if let Some(date) = filter.date {
            qb.push(" AND DATE(departure) = ").push_bind(date);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY departure");

        let rows: Vec<FlightRow> = qb
            .build_query_as()
            .fetch_all(&db.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(FlightRow::into_flight).collect()
    }

    pub async fn update(db: &DbClient, id: Uuid, patch: FlightPatch) -> CoreResult<Flight> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let row: Option<FlightRow> = sqlx::query_as(
            "SELECT id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount
             FROM flights WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut flight = row
            .ok_or_else(|| CoreError::not_found("flight not found"))?
            .into_flight()?;
        patch.apply(&mut flight)?;

        sqlx::query(
            "UPDATE flights SET origin = $1, destination = $2, departure = $3, arrival = $4,
                                status = $5, base_price_amount = $6
             WHERE id = $7",
        )
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure)
        .bind(flight.arrival)
        .bind(flight.status.as_str())
        .bind(flight.base_price_amount)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(flight)
    }

    pub async fn delete(db: &DbClient, id: Uuid) -> CoreResult<()> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let (confirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations WHERE flight_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        if confirmed > 0 {
            return Err(CoreError::validation(
                "cannot delete a flight with confirmed reservations",
            ));
        }

        // Pending and cancelled reservations (and their tickets) go with the
        // flight via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("flight not found"));
        }

        tx.commit().await.map_err(db_err)?;
        info!(flight_id = %id, "Flight deleted");
        Ok(())
    }

    /// Aircraft capacity minus confirmed reservations.
    pub async fn available_seats(db: &DbClient, flight_id: Uuid) -> CoreResult<i64> {
        let flight = Self::get(db, flight_id).await?;

        let (capacity,): (i32,) = sqlx::query_as("SELECT capacity FROM aircraft WHERE id = $1")
            .bind(flight.aircraft_id)
            .fetch_one(&db.pool)
            .await
            .map_err(db_err)?;

        let (confirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations WHERE flight_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(flight_id)
        .fetch_one(&db.pool)
        .await
        .map_err(db_err)?;

        Ok(available_seat_count(capacity, confirmed))
    }

    /// Every seat of the flight's aircraft, with per-flight occupancy from
    /// confirmed reservations. Physical seat state is global to the aircraft,
    /// occupancy here is scoped to this flight.
    pub async fn seat_map(db: &DbClient, flight_id: Uuid) -> CoreResult<Vec<SeatMapEntry>> {
        let flight = Self::get(db, flight_id).await?;

        let rows: Vec<SeatMapRow> = sqlx::query_as(
            "SELECT s.id, s.aircraft_id, s.number, s.seat_row, s.seat_column, s.class, s.state,
                    r.id AS reservation_id, r.passenger_id
             FROM seats s
             LEFT JOIN reservations r
               ON r.seat_id = s.id AND r.flight_id = $1 AND r.status = 'CONFIRMED'
             WHERE s.aircraft_id = $2
             ORDER BY s.seat_row, s.seat_column",
        )
        .bind(flight_id)
        .bind(flight.aircraft_id)
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|row| {
                let seat = SeatRow {
                    id: row.id,
                    aircraft_id: row.aircraft_id,
                    number: row.number,
                    seat_row: row.seat_row,
                    seat_column: row.seat_column,
                    class: row.class,
                    state: row.state,
                }
                .into_seat()?;
                Ok(SeatMapEntry {
                    occupied: row.reservation_id.is_some(),
                    reservation_id: row.reservation_id,
                    passenger_id: row.passenger_id,
                    seat,
                })
            })
            .collect()
    }

    /// Boarding manifest: confirmed passengers with their seats, ordered for
    /// printing.
    pub async fn manifest(db: &DbClient, flight_id: Uuid) -> CoreResult<Vec<ManifestEntry>> {
        Self::get(db, flight_id).await?;

        let rows: Vec<ManifestEntry> = sqlx::query_as(
            "SELECT r.code, s.number AS seat_number,
                    p.first_name, p.last_name, p.document_type, p.document, p.email
             FROM reservations r
             JOIN passengers p ON p.id = r.passenger_id
             JOIN seats s ON s.id = r.seat_id
             WHERE r.flight_id = $1 AND r.status = 'CONFIRMED'
             ORDER BY s.seat_row, s.seat_column",
        )
        .bind(flight_id)
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        Ok(rows)
    }
}
