// Ticket aggregate and the overall status machine.
//
// Statuses: Open, InProgress, Resolve, Closed, Cancel.
// Time tracking is delegated to the embedded LogTime; every method here is pure.

use std::fmt;

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

use crate::modules::tickets::core::errors::TicketError;
use crate::modules::tickets::core::log_time::{
    LogTime, LogTimeStatus, ManualDuration, Settlement, StoppedRun,
};
use crate::shared::core::primitives::EpochMillis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolve,
    Closed,
    Cancel,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolve => "resolve",
            TicketStatus::Closed => "closed",
            TicketStatus::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Calendar breakdown of the creation instant, used for per-day aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailTime {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: String,
}

impl DetailTime {
    pub fn from_millis(at: EpochMillis) -> Self {
        match DateTime::from_timestamp_millis(at) {
            Some(moment) => Self {
                day: moment.day(),
                month: moment.month(),
                year: moment.year(),
                weekday: moment.weekday().to_string(),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub company_id: String,
    pub customer_id: String,
    pub project_id: Option<String>,
    pub category_id: Option<String>,
    pub subject: String,
    pub content: String,
    pub code: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub assigned_agents: Vec<String>,
    pub log_time: LogTime,
    pub detail_time: DetailTime,
    pub parent_id: Option<String>,
    pub completed_by: Option<AgentSnapshot>,
    pub reminder_sent: bool,
    pub token: Option<String>,
    pub closed_at: Option<EpochMillis>,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub version: i64,
}

/// Caller-supplied fields of a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub company_id: String,
    pub customer_id: String,
    pub subject: String,
    pub content: String,
    pub priority: Priority,
    pub project_id: Option<String>,
    pub category_id: Option<String>,
    pub parent_id: Option<String>,
}

impl Ticket {
    pub fn open(id: String, draft: TicketDraft, now: EpochMillis) -> Self {
        let suffix = id.get(id.len().saturating_sub(8)..).unwrap_or(&id);
        let code = format!("TCK-{}", suffix.to_ascii_uppercase());
        Self {
            id,
            company_id: draft.company_id,
            customer_id: draft.customer_id,
            project_id: draft.project_id,
            category_id: draft.category_id,
            subject: draft.subject,
            content: draft.content,
            code,
            status: TicketStatus::Open,
            priority: draft.priority,
            assigned_agents: Vec::new(),
            log_time: LogTime::default(),
            detail_time: DetailTime::from_millis(now),
            parent_id: draft.parent_id,
            completed_by: None,
            reminder_sent: false,
            token: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_assigned(&self, agent_id: &str) -> bool {
        self.assigned_agents.iter().any(|assigned| assigned == agent_id)
    }

    pub fn assign(&mut self, agent_id: &str) {
        if !self.is_assigned(agent_id) {
            self.assigned_agents.push(agent_id.to_string());
        }
    }

    pub fn start_log(&mut self, now: EpochMillis) -> Result<(), TicketError> {
        if matches!(self.status, TicketStatus::Closed | TicketStatus::Cancel) {
            return Err(TicketError::StatusNotAllowed {
                from: self.status,
                to: TicketStatus::InProgress,
            });
        }
        self.log_time.start(now)?;
        self.reminder_sent = false;
        // A pending confirmation link must not close a ticket that is worked on again.
        self.token = None;
        self.status = TicketStatus::InProgress;
        self.touch(now);
        Ok(())
    }

    pub fn pause_log(&mut self, now: EpochMillis) -> Result<Settlement, TicketError> {
        let settlement = self.log_time.pause(now)?;
        self.touch(now);
        Ok(settlement)
    }

    pub fn resume_log(&mut self, now: EpochMillis) -> Result<i64, TicketError> {
        let paused = self.log_time.resume(now)?;
        self.touch(now);
        Ok(paused)
    }

    pub fn stop_log(&mut self, now: EpochMillis) -> Result<StoppedRun, TicketError> {
        let run = self.log_time.stop(now)?;
        self.touch(now);
        Ok(run)
    }

    pub fn edit_log_manually(
        &mut self,
        duration: ManualDuration,
        now: EpochMillis,
    ) -> Result<i64, TicketError> {
        let total = self.log_time.edit_manual(duration)?;
        self.touch(now);
        Ok(total)
    }

    /// Settles the running log and marks the ticket resolved, ready for the
    /// customer to confirm with `token`.
    pub fn resolve(
        &mut self,
        now: EpochMillis,
        completed_by: AgentSnapshot,
        token: String,
    ) -> Option<Settlement> {
        let settlement = self.log_time.settle(now);
        self.status = TicketStatus::Resolve;
        self.reminder_sent = true;
        self.token = Some(token);
        self.completed_by = Some(completed_by);
        self.touch(now);
        settlement
    }

    pub fn close(&mut self, now: EpochMillis) -> Result<Option<Settlement>, TicketError> {
        let settlement = match self.status {
            TicketStatus::InProgress => self.log_time.settle(now),
            TicketStatus::Resolve if self.log_time.status == LogTimeStatus::Running => {
                return Err(TicketError::LogAlreadyRunning);
            }
            TicketStatus::Resolve => None,
            other => return Err(TicketError::NotClosable(other)),
        };
        self.status = TicketStatus::Closed;
        self.closed_at = Some(now);
        self.touch(now);
        Ok(settlement)
    }

    pub fn cancel(&mut self, now: EpochMillis) -> Result<(), TicketError> {
        if self.status != TicketStatus::Open {
            return Err(TicketError::NotCancellable);
        }
        self.status = TicketStatus::Cancel;
        self.touch(now);
        Ok(())
    }

    pub fn reopen(&mut self, now: EpochMillis) -> Result<(), TicketError> {
        if self.status != TicketStatus::Closed {
            return Err(TicketError::NotClosed);
        }
        self.status = TicketStatus::Open;
        self.closed_at = None;
        self.token = None;
        self.touch(now);
        Ok(())
    }

    /// Removes the confirmation token; it can be used once.
    pub fn consume_token(&mut self) -> Option<String> {
        self.token.take()
    }

    fn touch(&mut self, now: EpochMillis) {
        self.updated_at = now;
    }
}
