use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Token claims. Issuance lives in the identity service; this surface only
/// validates. `passenger_id` links a customer token to its passenger record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub passenger_id: Option<Uuid>,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}

/// Decode the bearer token and inject the claims into request extensions.
/// Every route behind this middleware can extract `Extension<Claims>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

/// Administrative routes reject customer tokens outright.
pub fn ensure_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::AuthorizationError(
            "administrator role required".to_string(),
        ));
    }
    Ok(())
}

/// Admin, or the customer whose token is linked to this passenger.
pub fn ensure_admin_or_self(claims: &Claims, passenger_id: Uuid) -> Result<(), AppError> {
    if claims.is_admin() || claims.passenger_id == Some(passenger_id) {
        return Ok(());
    }
    Err(AppError::AuthorizationError(
        "not allowed to access this passenger's data".to_string(),
    ))
}
