use async_trait::async_trait;
use tracing::info;

use aerodesk_core::notify::{TicketIssuedNotice, TicketNotifier};
use aerodesk_core::CoreResult;

/// Notifier that records the outgoing message in the log. Stands in for a
/// mail or messaging integration; delivery failures must never undo an
/// already-committed ticket.
pub struct LogTicketNotifier;

#[async_trait]
impl TicketNotifier for LogTicketNotifier {
    async fn ticket_issued(&self, notice: &TicketIssuedNotice) -> CoreResult<()> {
        info!(
            email = %notice.passenger_email,
            passenger = %notice.passenger_name,
            code = %notice.reservation_code,
            barcode = %notice.barcode,
            route = format!("{} -> {}", notice.origin, notice.destination),
            "Ticket issued notice"
        );
        Ok(())
    }
}
