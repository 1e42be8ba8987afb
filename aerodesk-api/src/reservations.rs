use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use aerodesk_reservations::{NewReservation, Reservation, ReservationPatch, Ticket};
use aerodesk_store::{ReservationRepository, TicketRepository};

use crate::auth::{ensure_admin, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route("/{id}", patch(update_reservation).get(get_reservation))
        .route("/by-code/{code}", get(get_by_code))
        .route("/{id}/confirm", post(confirm_reservation))
        .route("/{id}/cancel", post(cancel_reservation))
        .route("/{id}/ticket", post(issue_ticket).get(get_ticket))
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewReservation>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    ensure_admin(&claims)?;
    let reservation = ReservationRepository::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(ReservationRepository::get(&state.db, id).await?))
}

async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(
        ReservationRepository::get_by_code(&state.db, &code).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    flight_id: Option<Uuid>,
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(
        ReservationRepository::list(&state.db, query.flight_id).await?,
    ))
}

async fn update_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ReservationPatch>,
) -> Result<Json<Reservation>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(
        ReservationRepository::update(&state.db, id, patch).await?,
    ))
}

async fn confirm_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(ReservationRepository::confirm(&state.db, id).await?))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(ReservationRepository::cancel(&state.db, id).await?))
}

/// Issue the ticket, then notify the passenger. The notification runs after
/// commit; a delivery failure is logged and never fails the request.
async fn issue_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    ensure_admin(&claims)?;
    let (ticket, notice) = TicketRepository::issue(&state.db, id).await?;

    if let Err(err) = state.notifier.ticket_issued(&notice).await {
        tracing::warn!(
            reservation_id = %id,
            error = %err,
            "Ticket issued but the notification failed"
        );
    }

    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    Ok(Json(
        TicketRepository::get_for_reservation(&state.db, id).await?,
    ))
}
