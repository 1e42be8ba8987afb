use std::sync::Arc;

use aerodesk_core::notify::TicketNotifier;
use aerodesk_store::DbClient;

/// Token issuance lives in the identity service; this surface only needs
/// the shared secret to validate.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub notifier: Arc<dyn TicketNotifier>,
    pub auth: AuthConfig,
}
