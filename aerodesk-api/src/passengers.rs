use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use aerodesk_reservations::{NewPassenger, Passenger, PassengerPatch, Reservation};
use aerodesk_store::PassengerRepository;

use crate::auth::{ensure_admin, ensure_admin_or_self, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_passengers).post(create_passenger))
        .route(
            "/{id}",
            patch(update_passenger)
                .get(get_passenger)
                .delete(delete_passenger),
        )
        .route("/by-document/{document}", get(get_by_document))
        .route("/{id}/reservations", get(list_reservations))
}

async fn create_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewPassenger>,
) -> Result<(StatusCode, Json<Passenger>), AppError> {
    ensure_admin(&claims)?;
    let passenger = PassengerRepository::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(passenger)))
}

async fn get_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Passenger>, AppError> {
    ensure_admin_or_self(&claims, id)?;
    Ok(Json(PassengerRepository::get(&state.db, id).await?))
}

async fn get_by_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(document): Path<String>,
) -> Result<Json<Passenger>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(
        PassengerRepository::get_by_document(&state.db, &document).await?,
    ))
}

async fn list_passengers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Passenger>>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(PassengerRepository::list(&state.db).await?))
}

async fn update_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PassengerPatch>,
) -> Result<Json<Passenger>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(PassengerRepository::update(&state.db, id, patch).await?))
}

async fn delete_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ensure_admin(&claims)?;
    PassengerRepository::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ReservationListQuery {
    #[serde(default)]
    active: bool,
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    ensure_admin_or_self(&claims, id)?;
    Ok(Json(
        PassengerRepository::reservations(&state.db, id, query.active).await?,
    ))
}
