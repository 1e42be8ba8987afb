use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use aerodesk_catalog::{Flight, FlightFilter, FlightPatch, NewFlight};
use aerodesk_store::{FlightRepository, SeatMapEntry};

use crate::auth::{ensure_admin, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_flights).post(create_flight))
        .route(
            "/{id}",
            patch(update_flight).get(get_flight).delete(delete_flight),
        )
        .route("/{id}/availability", get(availability))
        .route("/{id}/seat-map", get(seat_map))
}

async fn create_flight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewFlight>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    ensure_admin(&claims)?;
    let flight = FlightRepository::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(FlightRepository::get(&state.db, id).await?))
}

/// All filter criteria are optional query parameters combined with AND,
/// e.g. `/flights?origin=EZE&date=2026-09-01`.
async fn list_flights(
    State(state): State<AppState>,
    Query(filter): Query<FlightFilter>,
) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(FlightRepository::list(&state.db, filter).await?))
}

async fn update_flight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<FlightPatch>,
) -> Result<Json<Flight>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(FlightRepository::update(&state.db, id, patch).await?))
}

async fn delete_flight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ensure_admin(&claims)?;
    FlightRepository::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    flight_id: Uuid,
    available_seats: i64,
}

async fn availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available_seats = FlightRepository::available_seats(&state.db, id).await?;
    Ok(Json(AvailabilityResponse {
        flight_id: id,
        available_seats,
    }))
}

async fn seat_map(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SeatMapEntry>>, AppError> {
    Ok(Json(FlightRepository::seat_map(&state.db, id).await?))
}
