use chrono::Utc;
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use aerodesk_core::codes::{random_reservation_code, MAX_CODE_ATTEMPTS};
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_reservations::{rules, NewReservation, Reservation, ReservationPatch, ReservationStatus};

use crate::rows::{FlightRow, ReservationRow, SeatRow};
use crate::{db_err, unique_conflict, DbClient};

const RESERVATION_COLUMNS: &str =
    "id, flight_id, passenger_id, seat_id, code, status, price_amount, created_at";

pub struct ReservationRepository;

impl ReservationRepository {
    /// Create a reservation. Availability checks, code allocation, the insert
    /// and the seat-state side effect all run in one transaction; the row
    /// locks and partial unique indexes close the races the checks leave open.
    pub async fn create(db: &DbClient, req: NewReservation) -> CoreResult<Reservation> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let flight_row: Option<FlightRow> = sqlx::query_as(
            "SELECT id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount
             FROM flights WHERE id = $1",
        )
        .bind(req.flight_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let flight = flight_row
            .ok_or_else(|| CoreError::not_found("flight not found"))?
            .into_flight()?;

        let (passenger_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM passengers WHERE id = $1)")
                .bind(req.passenger_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;
        if !passenger_exists {
            return Err(CoreError::not_found("passenger not found"));
        }

        let seat = Self::fetch_seat_for_update(&mut tx, req.seat_id).await?;

        rules::check_seat_belongs_to_flight(&seat, &flight)?;
        rules::check_seat_unclaimed(
            Self::confirmed_for_seat(&mut tx, flight.id, seat.id, None).await?,
        )?;
        rules::check_passenger_unbooked(
            Self::active_for_passenger(&mut tx, flight.id, req.passenger_id).await?,
        )?;

        let code = Self::allocate_code(&mut tx).await?;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            flight_id: flight.id,
            passenger_id: req.passenger_id,
            seat_id: seat.id,
            code,
            status: req.status.unwrap_or(ReservationStatus::Pending),
            price_amount: req.price_amount.unwrap_or(flight.base_price_amount),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO reservations (id, flight_id, passenger_id, seat_id, code, status, price_amount, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(reservation.id)
        .bind(reservation.flight_id)
        .bind(reservation.passenger_id)
        .bind(reservation.seat_id)
        .bind(&reservation.code)
        .bind(reservation.status.as_str())
        .bind(reservation.price_amount)
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_conflict(e, "the seat is already reserved for this flight"))?;

        if reservation.status == ReservationStatus::Confirmed {
            Self::occupy_seat(&mut tx, reservation.seat_id).await?;
        }

        tx.commit().await.map_err(db_err)?;

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            flight_id = %reservation.flight_id,
            status = reservation.status.as_str(),
            "Reservation created"
        );
        Ok(reservation)
    }

    pub async fn get(db: &DbClient, id: Uuid) -> CoreResult<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("reservation not found"))?
            .into_reservation()
    }

    pub async fn get_by_code(db: &DbClient, code: &str) -> CoreResult<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("reservation not found"))?
            .into_reservation()
    }

    pub async fn list(db: &DbClient, flight_id: Option<Uuid>) -> CoreResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = match flight_id {
            Some(flight_id) => {
                sqlx::query_as(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations
                     WHERE flight_id = $1 ORDER BY created_at DESC"
                ))
                .bind(flight_id)
                .fetch_all(&db.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY created_at DESC"
                ))
                .fetch_all(&db.pool)
                .await
            }
        }
        .map_err(db_err)?;

        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }

    pub async fn confirm(db: &DbClient, id: Uuid) -> CoreResult<Reservation> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let mut reservation = Self::fetch_for_update(&mut tx, id).await?;
        reservation.confirm()?;
        Self::set_status(&mut tx, id, reservation.status).await?;
        Self::occupy_seat(&mut tx, reservation.seat_id).await?;

        tx.commit().await.map_err(db_err)?;
        info!(reservation_id = %id, code = %reservation.code, "Reservation confirmed");
        Ok(reservation)
    }

    pub async fn cancel(db: &DbClient, id: Uuid) -> CoreResult<Reservation> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let mut reservation = Self::fetch_for_update(&mut tx, id).await?;
        reservation.cancel()?;
        Self::set_status(&mut tx, id, reservation.status).await?;
        Self::release_seat(&mut tx, reservation.seat_id).await?;
        // Cascade: an issued (or used) ticket becomes void with the
        // cancellation; an already-void ticket is left alone.
        Self::void_tickets(&mut tx, id).await?;

        tx.commit().await.map_err(db_err)?;
        info!(reservation_id = %id, code = %reservation.code, "Reservation cancelled");
        Ok(reservation)
    }

    pub async fn update(db: &DbClient, id: Uuid, patch: ReservationPatch) -> CoreResult<Reservation> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let mut reservation = Self::fetch_for_update(&mut tx, id).await?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(CoreError::validation(
                "a cancelled reservation cannot be updated",
            ));
        }

        if let Some(new_seat_id) = patch.seat_id {
            if rules::seat_actually_changes(reservation.seat_id, new_seat_id) {
                let flight_row: Option<FlightRow> = sqlx::query_as(
                    "SELECT id, aircraft_id, origin, destination, departure, arrival, status, base_price_amount
                     FROM flights WHERE id = $1",
                )
                .bind(reservation.flight_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
                let flight = flight_row
                    .ok_or_else(|| CoreError::internal("reservation references a missing flight"))?
                    .into_flight()?;

                let new_seat = Self::fetch_seat_for_update(&mut tx, new_seat_id).await?;
                rules::check_seat_belongs_to_flight(&new_seat, &flight)?;
                rules::check_seat_unclaimed(
                    Self::confirmed_for_seat(&mut tx, flight.id, new_seat_id, Some(reservation.id))
                        .await?,
                )?;

                if reservation.status == ReservationStatus::Confirmed {
                    Self::release_seat(&mut tx, reservation.seat_id).await?;
                    Self::occupy_seat(&mut tx, new_seat_id).await?;
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
                    reservation.confirm()?;
                    Self::occupy_seat(&mut tx, reservation.seat_id).await?;
                }
                ReservationStatus::Cancelled => {
                    reservation.cancel()?;
                    Self::release_seat(&mut tx, reservation.seat_id).await?;
                    Self::void_tickets(&mut tx, id).await?;
                }
            }
        }

        sqlx::query(
            "UPDATE reservations SET seat_id = $1, status = $2, price_amount = $3 WHERE id = $4",
        )
        .bind(reservation.seat_id)
        .bind(reservation.status.as_str())
        .bind(reservation.price_amount)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_conflict(e, "the seat is already reserved for this flight"))?;

        tx.commit().await.map_err(db_err)?;
        Ok(reservation)
    }

    // ------------------------------------------------------------------
    // Transaction helpers
    // ------------------------------------------------------------------

    pub(crate) async fn fetch_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> CoreResult<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("reservation not found"))?
            .into_reservation()
    }

    async fn fetch_seat_for_update(
        tx: &mut Transaction<'_, Postgres>,
        seat_id: Uuid,
    ) -> CoreResult<aerodesk_catalog::Seat> {
        let row: Option<SeatRow> = sqlx::query_as(
            "SELECT id, aircraft_id, number, seat_row, seat_column, class, state
             FROM seats WHERE id = $1 FOR UPDATE",
        )
        .bind(seat_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("seat not found"))?
            .into_seat()
    }

    async fn confirmed_for_seat(
        tx: &mut Transaction<'_, Postgres>,
        flight_id: Uuid,
        seat_id: Uuid,
        exclude: Option<Uuid>,
    ) -> CoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations
             WHERE flight_id = $1 AND seat_id = $2 AND status = 'CONFIRMED'
               AND ($3::uuid IS NULL OR id <> $3)",
        )
        .bind(flight_id)
        .bind(seat_id)
        .bind(exclude)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)?;
        Ok(count)
    }

    async fn active_for_passenger(
        tx: &mut Transaction<'_, Postgres>,
        flight_id: Uuid,
        passenger_id: Uuid,
    ) -> CoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations
             WHERE flight_id = $1 AND passenger_id = $2 AND status <> 'CANCELLED'",
        )
        .bind(flight_id)
        .bind(passenger_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)?;
        Ok(count)
    }

    /// Draw random codes until one is free, bounded so a dense code space
    /// surfaces as a retryable conflict instead of a stuck transaction.
    async fn allocate_code(tx: &mut Transaction<'_, Postgres>) -> CoreResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = random_reservation_code();
            let (taken,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reservations WHERE code = $1)")
                    .bind(&candidate)
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(db_err)?;
            if !taken {
                return Ok(candidate);
            }
        }
        Err(CoreError::conflict(
            "could not allocate a unique reservation code, please retry",
        ))
    }

    async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ReservationStatus,
    ) -> CoreResult<()> {
        sqlx::query("UPDATE reservations SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| unique_conflict(e, "the seat is already reserved for this flight"))?;
        Ok(())
    }

    async fn occupy_seat(tx: &mut Transaction<'_, Postgres>, seat_id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE seats SET state = 'OCCUPIED' WHERE id = $1")
            .bind(seat_id)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Seats under maintenance stay under maintenance when freed.
    async fn release_seat(tx: &mut Transaction<'_, Postgres>, seat_id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE seats SET state = 'AVAILABLE' WHERE id = $1 AND state <> 'MAINTENANCE'")
            .bind(seat_id)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn void_tickets(tx: &mut Transaction<'_, Postgres>, reservation_id: Uuid) -> CoreResult<()> {
        sqlx::query(
            "UPDATE tickets SET status = 'VOID' WHERE reservation_id = $1 AND status <> 'VOID'",
        )
        .bind(reservation_id)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
