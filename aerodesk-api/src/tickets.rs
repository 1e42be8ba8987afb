use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use aerodesk_reservations::Ticket;
use aerodesk_store::TicketRepository;

use crate::auth::{ensure_admin, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickets))
        .route("/{id}", get(get_ticket))
        .route("/by-barcode/{barcode}", get(get_by_barcode))
        .route("/{id}/void", post(void_ticket))
        .route("/{id}/use", post(use_ticket))
}

async fn list_tickets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(TicketRepository::list(&state.db).await?))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    Ok(Json(TicketRepository::get(&state.db, id).await?))
}

/// Barcode lookup backs the boarding scan.
async fn get_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    Ok(Json(
        TicketRepository::get_by_barcode(&state.db, &barcode).await?,
    ))
}

async fn void_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(TicketRepository::void(&state.db, id).await?))
}

async fn use_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(TicketRepository::mark_used(&state.db, id).await?))
}
