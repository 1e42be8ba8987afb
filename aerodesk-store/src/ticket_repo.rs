use tracing::info;
use uuid::Uuid;

use aerodesk_core::notify::TicketIssuedNotice;
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_reservations::Ticket;

use crate::reservation_repo::ReservationRepository;
use crate::rows::TicketRow;
use crate::{db_err, unique_conflict, DbClient};

const TICKET_COLUMNS: &str = "id, reservation_id, barcode, issued_at, status";

pub struct TicketRepository;

impl TicketRepository {
    /// Issue the ticket for a confirmed reservation and assemble the notice
    /// for the passenger. Persisting and gathering the notice data share the
    /// transaction; actually sending it is the caller's business, after
    /// commit.
    pub async fn issue(
        db: &DbClient,
        reservation_id: Uuid,
    ) -> CoreResult<(Ticket, TicketIssuedNotice)> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let reservation = ReservationRepository::fetch_for_update(&mut tx, reservation_id).await?;

        let (already_has_ticket,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tickets WHERE reservation_id = $1)")
                .bind(reservation_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

        let ticket = Ticket::issue_for(&reservation, already_has_ticket)?;

        sqlx::query(
            "INSERT INTO tickets (id, reservation_id, barcode, issued_at, status)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(ticket.id)
        .bind(ticket.reservation_id)
        .bind(&ticket.barcode)
        .bind(ticket.issued_at)
        .bind(ticket.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_conflict(e, "the reservation already has a ticket"))?;

        let (first_name, last_name, email, origin, destination): (
            String,
            String,
            String,
            String,
            String,
        ) = sqlx::query_as(
            "SELECT p.first_name, p.last_name, p.email, f.origin, f.destination
             FROM reservations r
             JOIN passengers p ON p.id = r.passenger_id
             JOIN flights f ON f.id = r.flight_id
             WHERE r.id = $1",
        )
        .bind(reservation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        info!(
            ticket_id = %ticket.id,
            reservation_id = %reservation_id,
            barcode = %ticket.barcode,
            "Ticket issued"
        );

        let notice = TicketIssuedNotice {
            passenger_email: email,
            passenger_name: format!("{first_name} {last_name}"),
            reservation_code: reservation.code,
            barcode: ticket.barcode.clone(),
            origin,
            destination,
        };
        Ok((ticket, notice))
    }

    pub async fn get(db: &DbClient, id: Uuid) -> CoreResult<Ticket> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
                .bind(id)
                .fetch_optional(&db.pool)
                .await
                .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("ticket not found"))?
            .into_ticket()
    }

    pub async fn get_by_barcode(db: &DbClient, barcode: &str) -> CoreResult<Ticket> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE barcode = $1"
        ))
        .bind(barcode)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("ticket not found"))?
            .into_ticket()
    }

    pub async fn get_for_reservation(db: &DbClient, reservation_id: Uuid) -> CoreResult<Ticket> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE reservation_id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| CoreError::not_found("ticket not found"))?
            .into_ticket()
    }

    pub async fn list(db: &DbClient) -> CoreResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY issued_at DESC"
        ))
        .fetch_all(&db.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    pub async fn void(db: &DbClient, id: Uuid) -> CoreResult<Ticket> {
        Self::transition(db, id, Ticket::void).await
    }

    /// Check-in.
    pub async fn mark_used(db: &DbClient, id: Uuid) -> CoreResult<Ticket> {
        Self::transition(db, id, Ticket::mark_used).await
    }

    async fn transition(
        db: &DbClient,
        id: Uuid,
        apply: fn(&mut Ticket) -> CoreResult<()>,
    ) -> CoreResult<Ticket> {
        let mut tx = db.pool.begin().await.map_err(db_err)?;

        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut ticket = row
            .ok_or_else(|| CoreError::not_found("ticket not found"))?
            .into_ticket()?;
        apply(&mut ticket)?;

        sqlx::query("UPDATE tickets SET status = $1 WHERE id = $2")
            .bind(ticket.status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        info!(ticket_id = %id, status = ticket.status.as_str(), "Ticket updated");
        Ok(ticket)
    }
}
