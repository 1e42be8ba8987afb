use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use aerodesk_reservations::Reservation;
use aerodesk_store::{FlightRepository, ManifestEntry, PassengerRepository};

use crate::auth::{ensure_admin, ensure_admin_or_self, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights/{id}/manifest", get(flight_manifest))
        .route(
            "/passengers/{id}/active-reservations",
            get(active_reservations),
        )
}

/// Confirmed passengers on a flight, seat order.
async fn flight_manifest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ManifestEntry>>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(FlightRepository::manifest(&state.db, id).await?))
}

/// A passenger's non-cancelled reservations, visible to staff and to the
/// passenger's own linked account.
async fn active_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    ensure_admin_or_self(&claims, id)?;
    Ok(Json(
        PassengerRepository::reservations(&state.db, id, true).await?,
    ))
}
