use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::codes;
use aerodesk_core::{CoreError, CoreResult};

use crate::models::{Reservation, ReservationStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Issued,
    Used,
    Void,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Issued => "ISSUED",
            TicketStatus::Used => "USED",
            TicketStatus::Void => "VOID",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "ISSUED" => Ok(TicketStatus::Issued),
            "USED" => Ok(TicketStatus::Used),
            "VOID" => Ok(TicketStatus::Void),
            other => Err(CoreError::internal(format!("unknown ticket status: {other}"))),
        }
    }
}

/// E-ticket, 1:1 with its reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub barcode: String,
    pub issued_at: DateTime<Utc>,
    pub status: TicketStatus,
}

impl Ticket {
    /// Issue a ticket for a confirmed reservation that has none yet.
    pub fn issue_for(reservation: &Reservation, already_has_ticket: bool) -> CoreResult<Ticket> {
        if reservation.status != ReservationStatus::Confirmed {
            return Err(CoreError::validation(
                "tickets can only be issued for confirmed reservations",
            ));
        }
        if already_has_ticket {
            return Err(CoreError::validation(
                "the reservation already has a ticket",
            ));
        }
        Ok(Ticket {
            id: Uuid::new_v4(),
            reservation_id: reservation.id,
            barcode: codes::generate_barcode(),
            issued_at: Utc::now(),
            status: TicketStatus::Issued,
        })
    }

    /// issued/used -> void. Voiding twice is an error, not a no-op.
    pub fn void(&mut self) -> CoreResult<()> {
        if self.status == TicketStatus::Void {
            return Err(CoreError::validation("the ticket is already void"));
        }
        self.status = TicketStatus::Void;
        Ok(())
    }

    /// issued -> used (check-in). Terminal.
    pub fn mark_used(&mut self) -> CoreResult<()> {
        match self.status {
            TicketStatus::Used => Err(CoreError::validation("the ticket was already used")),
            TicketStatus::Void => Err(CoreError::validation("a voided ticket cannot be used")),
            TicketStatus::Issued => {
                self.status = TicketStatus::Used;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            passenger_id: Uuid::new_v4(),
            seat_id: Uuid::new_v4(),
            code: "XK93JD01".to_string(),
            status,
            price_amount: 100,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_requires_confirmed_reservation() {
        assert!(Ticket::issue_for(&reservation(ReservationStatus::Pending), false).is_err());
        assert!(Ticket::issue_for(&reservation(ReservationStatus::Cancelled), false).is_err());
        let ticket = Ticket::issue_for(&reservation(ReservationStatus::Confirmed), false).unwrap();
        assert_eq!(ticket.status, TicketStatus::Issued);
        assert!(Uuid::parse_str(&ticket.barcode).is_ok());
    }

    #[test]
    fn test_issue_rejected_when_ticket_exists() {
        let result = Ticket::issue_for(&reservation(ReservationStatus::Confirmed), true);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_void_is_terminal() {
        let mut ticket = Ticket::issue_for(&reservation(ReservationStatus::Confirmed), false).unwrap();
        ticket.void().unwrap();
        assert!(ticket.void().is_err());
        assert!(ticket.mark_used().is_err());
    }

    #[test]
    fn test_used_is_terminal() {
        let mut ticket = Ticket::issue_for(&reservation(ReservationStatus::Confirmed), false).unwrap();
        ticket.mark_used().unwrap();
        assert!(ticket.mark_used().is_err());
        // The cancellation cascade may still void a used ticket.
        assert!(ticket.void().is_ok());
        assert_eq!(ticket.status, TicketStatus::Void);
    }
}
