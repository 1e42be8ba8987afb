use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use aerodesk_catalog::{Aircraft, AircraftPatch, Seat};
use aerodesk_core::{CoreError, CoreResult};

use crate::rows::{AircraftRow, SeatRow};
use crate::{db_err, DbClient};

pub struct AircraftRepository;

impl AircraftRepository {
    /// Persist an aircraft together with its generated seat grid in one
    /// transaction. Either the whole fleet entry exists or none of it does.
    pub async fn create(db: &DbClient, model: &str, rows: i32, columns: i32) -> CoreResult<Aircraft> {
        let aircraft = Aircraft::new(model.to_string(), rows, columns)?;

        let mut tx = db.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT INTO aircraft (id, model, seat_rows, seat_columns, capacity)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(aircraft.id)
        .bind(&aircraft.model)
        .bind(aircraft.rows)
        .bind(aircraft.columns)
        .bind(aircraft.capacity)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        Self::insert_seats(&mut tx, &aircraft).await?;

        tx.commit().await.map_err(db_err)?;

        info!(
            aircraft_id = %aircraft.id,
            model = %aircraft.model,
            capacity = aircraft.capacity,
            "Aircraft registered"
        );
        Ok(aircraft)
    }

    pub async fn get(db: &DbClient, id: Uuid) -> CoreResult<Aircraft> {
        let row: Option<AircraftRow> = sqlx::query_as(
            "SELECT id, model, seat_rows, seat_columns, capacity FROM aircraft WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.map(AircraftRow::into_aircraft)
            .ok_or_else(|| CoreError::not_found("aircraft not found"))
    }

    pub async fn list(db: &DbClient) -> CoreResult<Vec<Aircraft>> {
        let rows: Vec<AircraftRow> = sqlx::query_as(
            "SELECT id, model, seat_rows, seat_columns, capacity FROM aircraft ORDER BY model",
        )
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(AircraftRow::into_aircraft).collect())
    }

    /// Apply a partial update. A resize regenerates the seat grid, which is
    /// only allowed while no reservation references any of the seats.
    pub async fn update(db: &DbClient, id: Uuid, patch: AircraftPatch) -> CoreResult<Aircraft> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let row: Option<AircraftRow> = sqlx::query_as(
            "SELECT id, model, seat_rows, seat_columns, capacity
             FROM aircraft WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut aircraft = row
            .map(AircraftRow::into_aircraft)
            .ok_or_else(|| CoreError::not_found("aircraft not found"))?;

        let resizing = patch.resizes();
        if resizing {
            let (referenced,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM reservations r
                 JOIN seats s ON r.seat_id = s.id
                 WHERE s.aircraft_id = $1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

            if referenced > 0 {
                return Err(CoreError::validation(
                    "cannot resize an aircraft whose seats are referenced by reservations",
                ));
            }
        }

        patch.apply(&mut aircraft)?;

        sqlx::query(
            "UPDATE aircraft SET model = $1, seat_rows = $2, seat_columns = $3, capacity = $4
             WHERE id = $5",
        )
        .bind(&aircraft.model)
        .bind(aircraft.rows)
        .bind(aircraft.columns)
        .bind(aircraft.capacity)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if resizing {
            sqlx::query("DELETE FROM seats WHERE aircraft_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            Self::insert_seats(&mut tx, &aircraft).await?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(aircraft)
    }

    pub async fn delete(db: &DbClient, id: Uuid) -> CoreResult<()> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let (flights,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM flights WHERE aircraft_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;
        if flights > 0 {
            return Err(CoreError::validation(
                "cannot delete an aircraft with scheduled flights",
            ));
        }

        // Seats go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM aircraft WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("aircraft not found"));
        }

        tx.commit().await.map_err(db_err)?;
        info!(aircraft_id = %id, "Aircraft deleted");
        Ok(())
    }

    pub async fn seats(db: &DbClient, aircraft_id: Uuid) -> CoreResult<Vec<Seat>> {
        // Distinguish "no such aircraft" from "aircraft without seats".
        Self::get(db, aircraft_id).await?;

        let rows: Vec<SeatRow> = sqlx::query_as(
            "SELECT id, aircraft_id, number, seat_row, seat_column, class, state
             FROM seats WHERE aircraft_id = $1
             ORDER BY seat_row, seat_column",
        )
        .bind(aircraft_id)
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(SeatRow::into_seat).collect()
    }

    pub async fn get_seat(db: &DbClient, seat_id: Uuid) -> CoreResult<Seat> {
        let row: Option<SeatRow> = sqlx::query_as(
            "SELECT id, aircraft_id, number, seat_row, seat_column, class, state
             FROM seats WHERE id = $1",
        )
        .bind(seat_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("seat not found"))?
            .into_seat()
    }

    async fn insert_seats(
        tx: &mut Transaction<'_, Postgres>,
        aircraft: &Aircraft,
    ) -> CoreResult<()> {
        for seat in aircraft.generate_seats() {
            sqlx::query(
                "INSERT INTO seats (id, aircraft_id, number, seat_row, seat_column, class, state)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(seat.id)
            .bind(seat.aircraft_id)
            .bind(&seat.number)
            .bind(seat.row)
            .bind(seat.column.to_string())
            .bind(seat.class.as_str())
            .bind(seat.state.as_str())
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }
}
