use async_trait::async_trait;

use crate::CoreResult;

/// Payload handed to the notification side channel after a ticket is issued.
#[derive(Debug, Clone)]
pub struct TicketIssuedNotice {
    pub passenger_email: String,
    pub passenger_name: String,
    pub reservation_code: String,
    pub barcode: String,
    pub origin: String,
    pub destination: String,
}

/// Fire-and-forget "send ticket" channel (email with the e-ticket attached).
///
/// Failures are logged by the caller and never roll back the issuance.
#[async_trait]
pub trait TicketNotifier: Send + Sync {
    async fn ticket_issued(&self, notice: &TicketIssuedNotice) -> CoreResult<()>;
}
