// Ports to the document store. The engine codes against these traits only.
//
// Every query takes an explicit criteria struct; there are no open-ended filter maps.
// Ticket writes are compare-and-swap on `Ticket::version`.

use async_trait::async_trait;
use thiserror::Error;

use crate::modules::tickets::core::comment::TicketComment;
use crate::modules::tickets::core::customer::{Customer, CustomerBalanceHistory};
use crate::modules::tickets::core::notification::Notification;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::core::time_log_record::{ActivityType, TicketTimeLog};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version mismatch: expected {expected}, actual {actual}")]
    VersionMismatch { expected: i64, actual: i64 },

    #[error("{collection} record {id} not found")]
    Missing { collection: &'static str, id: String },

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketCriteria {
    pub id: Option<String>,
    pub company_id: Option<String>,
    pub customer_id: Option<String>,
    pub token: Option<String>,
}

impl TicketCriteria {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn in_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.id.as_ref().is_none_or(|id| &ticket.id == id)
            && self
                .company_id
                .as_ref()
                .is_none_or(|company_id| &ticket.company_id == company_id)
            && self
                .customer_id
                .as_ref()
                .is_none_or(|customer_id| &ticket.customer_id == customer_id)
            && self
                .token
                .as_ref()
                .is_none_or(|token| ticket.token.as_ref() == Some(token))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketTimeLogCriteria {
    pub ticket_id: Option<String>,
    pub activity_types: Vec<ActivityType>,
    pub closed_only: bool,
    pub sort: SortOrder,
}

impl TicketTimeLogCriteria {
    pub fn latest_for_ticket(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: Some(ticket_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &TicketTimeLog) -> bool {
        self.ticket_id
            .as_ref()
            .is_none_or(|ticket_id| &record.ticket_id == ticket_id)
            && (self.activity_types.is_empty()
                || self.activity_types.contains(&record.activity_type))
            && (!self.closed_only || record.end_at.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceHistoryCriteria {
    pub customer_id: Option<String>,
    pub ticket_id: Option<String>,
    pub time_log_id: Option<String>,
}

impl BalanceHistoryCriteria {
    pub fn matches(&self, row: &CustomerBalanceHistory) -> bool {
        self.customer_id
            .as_ref()
            .is_none_or(|customer_id| &row.customer_id == customer_id)
            && self
                .ticket_id
                .as_ref()
                .is_none_or(|ticket_id| &row.reference.unique_id == ticket_id)
            && self
                .time_log_id
                .as_ref()
                .is_none_or(|time_log_id| row.reference.time_log_id.as_ref() == Some(time_log_id))
    }
}

/// Partial update of a customer document. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub balance_time_used: Option<i64>,
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn fetch_one_ticket(
        &self,
        criteria: &TicketCriteria,
    ) -> Result<Option<Ticket>, StoreError>;
    async fn fetch_tickets(&self, criteria: &TicketCriteria) -> Result<Vec<Ticket>, StoreError>;
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;
    /// Writes `ticket` if the stored version still equals `ticket.version`.
    /// Returns the stored document with its bumped version.
    async fn update_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;
}

#[async_trait]
pub trait TicketTimeLogRepository: Send + Sync {
    async fn fetch_one_ticket_time_log(
        &self,
        criteria: &TicketTimeLogCriteria,
    ) -> Result<Option<TicketTimeLog>, StoreError>;
    async fn fetch_ticket_time_logs(
        &self,
        criteria: &TicketTimeLogCriteria,
    ) -> Result<Vec<TicketTimeLog>, StoreError>;
    async fn create_ticket_time_log(&self, record: &TicketTimeLog) -> Result<(), StoreError>;
    async fn update_ticket_time_log(&self, record: &TicketTimeLog) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn fetch_one_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError>;
    async fn update_one_customer(
        &self,
        customer_id: &str,
        patch: &CustomerPatch,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BalanceHistoryRepository: Send + Sync {
    async fn create_customer_balance_history(
        &self,
        row: &CustomerBalanceHistory,
    ) -> Result<(), StoreError>;
    async fn fetch_customer_balance_history(
        &self,
        criteria: &BalanceHistoryCriteria,
    ) -> Result<Vec<CustomerBalanceHistory>, StoreError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, notification: &Notification) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: &TicketComment) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CounterRepository: Send + Sync {
    async fn increment_agent_completed_tickets(&self, agent_id: &str) -> Result<(), StoreError>;
    async fn increment_company_ticket_counter(
        &self,
        company_id: &str,
        status: TicketStatus,
    ) -> Result<(), StoreError>;
}

/// Everything the engine needs from persistence, as one object.
pub trait DocumentStore:
    TicketRepository
    + TicketTimeLogRepository
    + CustomerRepository
    + BalanceHistoryRepository
    + NotificationRepository
    + CommentRepository
    + CounterRepository
{
}

impl<T> DocumentStore for T where
    T: TicketRepository
        + TicketTimeLogRepository
        + CustomerRepository
        + BalanceHistoryRepository
        + NotificationRepository
        + CommentRepository
        + CounterRepository
{
}

pub mod in_memory;
