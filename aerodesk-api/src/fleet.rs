use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use aerodesk_catalog::{Aircraft, AircraftPatch, Seat};
use aerodesk_store::AircraftRepository;

use crate::auth::{ensure_admin, Claims};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_aircraft).post(create_aircraft))
        .route(
            "/{id}",
            patch(update_aircraft).get(get_aircraft).delete(delete_aircraft),
        )
        .route("/{id}/seats", get(list_seats))
}

#[derive(Debug, Deserialize)]
struct CreateAircraftRequest {
    model: String,
    rows: i32,
    columns: i32,
}

async fn create_aircraft(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAircraftRequest>,
) -> Result<(StatusCode, Json<Aircraft>), AppError> {
    ensure_admin(&claims)?;
    let aircraft =
        AircraftRepository::create(&state.db, &req.model, req.rows, req.columns).await?;
    Ok((StatusCode::CREATED, Json(aircraft)))
}

async fn get_aircraft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Aircraft>, AppError> {
    Ok(Json(AircraftRepository::get(&state.db, id).await?))
}

async fn list_aircraft(State(state): State<AppState>) -> Result<Json<Vec<Aircraft>>, AppError> {
    Ok(Json(AircraftRepository::list(&state.db).await?))
}

async fn update_aircraft(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AircraftPatch>,
) -> Result<Json<Aircraft>, AppError> {
    ensure_admin(&claims)?;
    Ok(Json(AircraftRepository::update(&state.db, id, patch).await?))
}

async fn delete_aircraft(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ensure_admin(&claims)?;
    AircraftRepository::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Seat>>, AppError> {
    Ok(Json(AircraftRepository::seats(&state.db, id).await?))
}
