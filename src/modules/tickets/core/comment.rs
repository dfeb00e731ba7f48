use serde::{Deserialize, Serialize};

use crate::modules::tickets::core::claim::{Claim, Role};
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::shared::core::primitives::{EpochMillis, new_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: TicketStatus,
    pub to: TicketStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketComment {
    pub id: String,
    pub ticket_id: String,
    pub company_id: String,
    pub author_id: String,
    pub author_role: Role,
    pub content: String,
    pub attach_ids: Vec<String>,
    pub status_change: Option<StatusChange>,
    pub created_at: EpochMillis,
}

impl TicketComment {
    pub fn new(
        ticket: &Ticket,
        author: &Claim,
        content: String,
        attach_ids: Vec<String>,
        status_change: Option<StatusChange>,
        now: EpochMillis,
    ) -> Self {
        Self {
            id: new_id(),
            ticket_id: ticket.id.clone(),
            company_id: ticket.company_id.clone(),
            author_id: author.user_id.clone(),
            author_role: author.role,
            content,
            attach_ids,
            status_change,
            created_at: now,
        }
    }
}
