use tracing::info;
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};
use aerodesk_reservations::{NewPassenger, Passenger, PassengerPatch, Reservation};

use crate::rows::{PassengerRow, ReservationRow};
use crate::{db_err, unique_conflict, DbClient};

const PASSENGER_COLUMNS: &str = "id, user_id, first_name, last_name, document_type, document, \
                                 email, phone, date_of_birth";

pub struct PassengerRepository;

impl PassengerRepository {
    pub async fn create(db: &DbClient, spec: NewPassenger) -> CoreResult<Passenger> {
        let (document_taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM passengers WHERE document = $1)")
                .bind(&spec.document)
                .fetch_one(&db.pool)
                .await
                .map_err(db_err)?;
        if document_taken {
            return Err(CoreError::validation(
                "a passenger with this document already exists",
            ));
        }

        let (email_taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM passengers WHERE email = $1)")
                .bind(&spec.email)
                .fetch_one(&db.pool)
                .await
                .map_err(db_err)?;
        if email_taken {
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

        sqlx::query(
            "INSERT INTO passengers (id, user_id, first_name, last_name, document_type, document, email, phone, date_of_birth)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(passenger.id)
        .bind(passenger.user_id)
        .bind(&passenger.first_name)
        .bind(&passenger.last_name)
        .bind(passenger.document_type.as_str())
        .bind(&passenger.document)
        .bind(&passenger.email)
        .bind(&passenger.phone)
        .bind(passenger.date_of_birth)
        .execute(&db.pool)
        .await
        // The advisory checks above can race; the unique indexes decide.
        .map_err(|e| unique_conflict(e, "a passenger with this document or email already exists"))?;

        info!(passenger_id = %passenger.id, "Passenger registered");
        Ok(passenger)
    }

    pub async fn get(db: &DbClient, id: Uuid) -> CoreResult<Passenger> {
        let row: Option<PassengerRow> = sqlx::query_as(&format!(
            "SELECT {PASSENGER_COLUMNS} FROM passengers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("passenger not found"))?
            .into_passenger()
    }

    pub async fn get_by_document(db: &DbClient, document: &str) -> CoreResult<Passenger> {
        let row: Option<PassengerRow> = sqlx::query_as(&format!(
            "SELECT {PASSENGER_COLUMNS} FROM passengers WHERE document = $1"
        ))
        .bind(document)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("passenger not found"))?
            .into_passenger()
    }

    pub async fn list(db: &DbClient) -> CoreResult<Vec<Passenger>> {
        let rows: Vec<PassengerRow> = sqlx::query_as(&format!(
            "SELECT {PASSENGER_COLUMNS} FROM passengers ORDER BY last_name, first_name"
        ))
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(PassengerRow::into_passenger).collect()
    }

    pub async fn update(db: &DbClient, id: Uuid, patch: PassengerPatch) -> CoreResult<Passenger> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let row: Option<PassengerRow> = sqlx::query_as(&format!(
            "SELECT {PASSENGER_COLUMNS} FROM passengers WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut passenger = row
            .ok_or_else(|| CoreError::not_found("passenger not found"))?
            .into_passenger()?;

        if patch.touches_identity() {
            let (booked,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reservations WHERE passenger_id = $1)")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_err)?;
            if booked {
                return Err(CoreError::validation(
                    "document and email cannot change once the passenger has reservations",
                ));
            }
        }

        if let Some(first_name) = patch.first_name {
            passenger.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            passenger.last_name = last_name;
        }
        if let Some(document_type) = patch.document_type {
            passenger.document_type = document_type;
        }
        if let Some(document) = patch.document {
            passenger.document = document;
        }
        if let Some(email) = patch.email {
            passenger.email = email;
        }
        if let Some(phone) = patch.phone {
            passenger.phone = Some(phone);
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            passenger.date_of_birth = Some(date_of_birth);
        }

        sqlx::query(
            "UPDATE passengers SET first_name = $1, last_name = $2, document_type = $3,
                                   document = $4, email = $5, phone = $6, date_of_birth = $7
             WHERE id = $8",
        )
        .bind(&passenger.first_name)
        .bind(&passenger.last_name)
        .bind(passenger.document_type.as_str())
        .bind(&passenger.document)
        .bind(&passenger.email)
        .bind(&passenger.phone)
        .bind(passenger.date_of_birth)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_conflict(e, "a passenger with this document or email already exists"))?;

        tx.commit().await.map_err(db_err)?;
        Ok(passenger)
    }

    pub async fn delete(db: &DbClient, id: Uuid) -> CoreResult<()> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations WHERE passenger_id = $1 AND status <> 'CANCELLED'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        if active > 0 {
            return Err(CoreError::validation(
                "cannot delete a passenger with active reservations",
            ));
        }

        let result = sqlx::query("DELETE FROM passengers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("passenger not found"));
        }

        tx.commit().await.map_err(db_err)?;
        info!(passenger_id = %id, "Passenger deleted");
        Ok(())
    }

    /// Reservation history for a passenger, optionally narrowed to the ones
    /// still holding a seat claim.
    pub async fn reservations(
        db: &DbClient,
        passenger_id: Uuid,
        active_only: bool,
    ) -> CoreResult<Vec<Reservation>> {
        Self::get(db, passenger_id).await?;

        let sql = if active_only {
            "SELECT id, flight_id, passenger_id, seat_id, code, status, price_amount, created_at
             FROM reservations WHERE passenger_id = $1 AND status <> 'CANCELLED'
             ORDER BY created_at DESC"
        } else {
            "SELECT id, flight_id, passenger_id, seat_id, code, status, price_amount, created_at
             FROM reservations WHERE passenger_id = $1
             ORDER BY created_at DESC"
        };

        let rows: Vec<ReservationRow> = sqlx::query_as(sql)
            .bind(passenger_id)
            .fetch_all(&db.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }
}
