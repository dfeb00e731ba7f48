use serde::{Deserialize, Serialize};

use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::shared::core::primitives::{EpochMillis, new_id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub company_id: String,
    pub ticket_id: String,
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: EpochMillis,
}

impl Notification {
    pub fn status_changed(
        ticket: &Ticket,
        previous: TicketStatus,
        actor_name: &str,
        now: EpochMillis,
    ) -> Self {
        Self {
            id: new_id(),
            company_id: ticket.company_id.clone(),
            ticket_id: ticket.id.clone(),
            recipient_id: ticket.customer_id.clone(),
            title: format!("Ticket {} is now {}", ticket.code, ticket.status),
            message: format!(
                "{actor_name} moved ticket {} from {previous} to {}.",
                ticket.code, ticket.status
            ),
            is_read: false,
            created_at: now,
        }
    }
}
