// One append-only audit record per time-tracking event on a ticket.
//
// Records are never deleted. The only in-place update is closing the most
// recent record (end_at and an accumulated duration).

use serde::{Deserialize, Serialize};

use crate::modules::tickets::core::log_time::PauseEntry;
use crate::modules::tickets::core::ticket::Ticket;
use crate::shared::core::primitives::{EpochMillis, new_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    #[serde(rename = "start log")]
    StartLog,
    #[serde(rename = "stop log")]
    StopLog,
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "resume log")]
    ResumeLog,
    #[serde(rename = "ticket open")]
    TicketOpen,
    #[serde(rename = "ticket in progress")]
    TicketInProgress,
    #[serde(rename = "edit time track")]
    EditTimeTrack,
}

impl ActivityType {
    /// Activities whose record is later closed by a pause or a settlement.
    pub const SETTLEABLE: [ActivityType; 3] = [
        ActivityType::StartLog,
        ActivityType::ResumeLog,
        ActivityType::TicketInProgress,
    ];

    pub fn is_settleable(&self) -> bool {
        Self::SETTLEABLE.contains(self)
    }

    /// Wire name, as stored in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::StartLog => "start log",
            ActivityType::StopLog => "stop log",
            ActivityType::Pause => "pause",
            ActivityType::ResumeLog => "resume log",
            ActivityType::TicketOpen => "ticket open",
            ActivityType::TicketInProgress => "ticket in progress",
            ActivityType::EditTimeTrack => "edit time track",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTimeLog {
    pub id: String,
    pub ticket_id: String,
    pub customer_id: String,
    pub company_id: String,
    pub duration_in_seconds: i64,
    pub pause_duration_in_seconds: i64,
    pub start_at: EpochMillis,
    pub end_at: Option<EpochMillis>,
    pub pause_history: Vec<PauseEntry>,
    pub is_manual: bool,
    pub activity_type: ActivityType,
    pub created_by: Option<String>,
    pub created_at: EpochMillis,
}

impl TicketTimeLog {
    /// Snapshot of the ticket's log at `now`, open-ended.
    pub fn snapshot(
        ticket: &Ticket,
        activity_type: ActivityType,
        created_by: Option<String>,
        now: EpochMillis,
    ) -> Self {
        Self {
            id: new_id(),
            ticket_id: ticket.id.clone(),
            customer_id: ticket.customer_id.clone(),
            company_id: ticket.company_id.clone(),
            duration_in_seconds: 0,
            pause_duration_in_seconds: ticket.log_time.pause_duration_in_seconds,
            start_at: now,
            end_at: None,
            pause_history: ticket.log_time.pause_history.clone(),
            is_manual: false,
            activity_type,
            created_by,
            created_at: now,
        }
    }

    /// Turns an open snapshot into an already completed entry.
    pub fn finished(
        mut self,
        start_at: EpochMillis,
        end_at: Option<EpochMillis>,
        duration_in_seconds: i64,
    ) -> Self {
        self.start_at = start_at;
        self.end_at = end_at;
        self.duration_in_seconds = duration_in_seconds;
        self
    }

    pub fn manual(mut self) -> Self {
        self.is_manual = true;
        self
    }

    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }
}
