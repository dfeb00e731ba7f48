// Append-only audit trail of time-tracking events.
//
// Responsibilities
// - Open a record when a run starts or resumes, or when work begins on a ticket.
// - Close the most recent record of a ticket when the run is paused or settled.
// - Persist entries that are complete when written (stop, manual edit, ticket open).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::modules::tickets::core::ticket::Ticket;
use crate::modules::tickets::core::time_log_record::{ActivityType, TicketTimeLog};
use crate::shared::core::primitives::EpochMillis;
use crate::shared::infrastructure::document_store::{
    DocumentStore, SortOrder, StoreError, TicketTimeLogCriteria, TicketTimeLogRepository,
};

#[derive(Clone)]
pub struct TimelogAuditTrail {
    store: Arc<dyn DocumentStore>,
}

impl TimelogAuditTrail {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn open(
        &self,
        ticket: &Ticket,
        activity: ActivityType,
        actor_id: Option<&str>,
        now: EpochMillis,
    ) -> Result<TicketTimeLog, StoreError> {
        let record = TicketTimeLog::snapshot(ticket, activity, actor_id.map(str::to_string), now);
        self.store.create_ticket_time_log(&record).await?;
        debug!(
            ticket_id = %ticket.id,
            record_id = %record.id,
            activity = ?activity,
            "audit record opened"
        );
        Ok(record)
    }

    /// Closes the ticket's most recent record at `end_at`, adding `delta_seconds`
    /// to its duration. Returns `None` when the ticket has no record yet.
    pub async fn close(
        &self,
        ticket: &Ticket,
        end_at: EpochMillis,
        delta_seconds: i64,
    ) -> Result<Option<TicketTimeLog>, StoreError> {
        let latest = self
            .store
            .fetch_one_ticket_time_log(&TicketTimeLogCriteria::latest_for_ticket(&ticket.id))
            .await?;
        let Some(mut record) = latest else {
            warn!(ticket_id = %ticket.id, "no audit record to close");
            return Ok(None);
        };
        record.end_at = Some(end_at);
        record.duration_in_seconds += delta_seconds;
        record.pause_duration_in_seconds = ticket.log_time.pause_duration_in_seconds;
        record.pause_history = ticket.log_time.pause_history.clone();
        self.store.update_ticket_time_log(&record).await?;
        debug!(
            ticket_id = %ticket.id,
            record_id = %record.id,
            delta_seconds,
            "audit record closed"
        );
        Ok(Some(record))
    }

    pub async fn record(&self, entry: TicketTimeLog) -> Result<TicketTimeLog, StoreError> {
        self.store.create_ticket_time_log(&entry).await?;
        debug!(
            ticket_id = %entry.ticket_id,
            record_id = %entry.id,
            activity = ?entry.activity_type,
            "audit entry recorded"
        );
        Ok(entry)
    }

    /// Every record of the ticket, oldest first.
    pub async fn history(&self, ticket_id: &str) -> Result<Vec<TicketTimeLog>, StoreError> {
        self.store
            .fetch_ticket_time_logs(&TicketTimeLogCriteria {
                ticket_id: Some(ticket_id.to_string()),
                sort: SortOrder::CreatedAtAsc,
                ..TicketTimeLogCriteria::default()
            })
            .await
    }

    /// Closed records whose interval should have been debited.
    pub async fn settleable(&self, ticket_id: &str) -> Result<Vec<TicketTimeLog>, StoreError> {
        self.store
            .fetch_ticket_time_logs(&TicketTimeLogCriteria {
                ticket_id: Some(ticket_id.to_string()),
                activity_types: ActivityType::SETTLEABLE.to_vec(),
                closed_only: true,
                sort: SortOrder::CreatedAtAsc,
            })
            .await
    }
}
