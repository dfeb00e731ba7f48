// Collaborators shared by the ticket use cases, plus the write sequence they
// all follow: ticket (compare-and-swap), then audit trail, then balance.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::modules::tickets::adapters::outbound::audit_trail::TimelogAuditTrail;
use crate::modules::tickets::adapters::outbound::balance_settlement::{BalanceSettlement, Debit};
use crate::modules::tickets::adapters::outbound::notifier::Notifier;
use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::customer::{Customer, CustomerBalanceHistory};
use crate::modules::tickets::core::log_time::Settlement;
use crate::modules::tickets::core::policy::PolicyGate;
use crate::modules::tickets::core::ticket::Ticket;
use crate::modules::tickets::core::time_log_record::TicketTimeLog;
use crate::modules::tickets::use_cases::errors::{ApplicationError, WriteStep};
use crate::shared::core::primitives::Clock;
use crate::shared::infrastructure::background::BackgroundTasks;
use crate::shared::infrastructure::document_store::{
    CustomerRepository, DocumentStore, TicketCriteria, TicketRepository,
};
use crate::shared::infrastructure::mailer::Mailer;

#[derive(Clone)]
pub struct TicketContext {
    pub store: Arc<dyn DocumentStore>,
    pub audit: TimelogAuditTrail,
    pub settlement: BalanceSettlement,
    pub notifier: Notifier,
    pub policy: PolicyGate,
    pub clock: Arc<dyn Clock>,
}

/// Response body of every operation that returns the ticket and, when one was
/// written, the audit record.
#[derive(Debug, Clone, Serialize)]
pub struct TicketOutcome {
    pub ticket: Ticket,
    pub time_log: Option<TicketTimeLog>,
}

/// Result of closing an active interval against the audit trail and the balance.
#[derive(Debug, Clone, Default)]
pub struct SettledRun {
    pub record: Option<TicketTimeLog>,
    pub ledger: Option<CustomerBalanceHistory>,
}

impl TicketContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        tasks: Arc<BackgroundTasks>,
        clock: Arc<dyn Clock>,
        policy: PolicyGate,
    ) -> Self {
        Self {
            audit: TimelogAuditTrail::new(store.clone()),
            settlement: BalanceSettlement::new(store.clone(), clock.clone()),
            notifier: Notifier::new(store.clone(), mailer, tasks, clock.clone()),
            store,
            policy,
            clock,
        }
    }

    /// Tickets outside the actor's company are reported as missing.
    pub async fn load_ticket(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<Ticket, ApplicationError> {
        self.store
            .fetch_one_ticket(&TicketCriteria::by_id(ticket_id).in_company(&actor.company_id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("ticket", ticket_id))
    }

    pub async fn load_customer(&self, customer_id: &str) -> Result<Customer, ApplicationError> {
        self.store
            .fetch_one_customer(customer_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("customer", customer_id))
    }

    /// First write of every operation. A lost race surfaces as a conflict.
    pub async fn save_ticket(&self, ticket: &Ticket) -> Result<Ticket, ApplicationError> {
        Ok(self.store.update_ticket(ticket).await?)
    }

    /// Closes the most recent audit record at the settlement boundary and debits
    /// the interval. Runs after the ticket write has been committed.
    pub async fn settle_run(
        &self,
        ticket: &Ticket,
        settlement: Settlement,
    ) -> Result<SettledRun, ApplicationError> {
        let mut committed = vec![WriteStep::Ticket];
        let record = self
            .audit
            .close(ticket, settlement.logs_end_at, settlement.interval_seconds)
            .await
            .map_err(|error| ApplicationError::partial(WriteStep::AuditTrail, &committed, error))?;
        committed.push(WriteStep::AuditTrail);

        if settlement.interval_seconds == 0 {
            return Ok(SettledRun { record, ledger: None });
        }
        if record.is_none() {
            warn!(ticket_id = %ticket.id, "debiting an interval without an audit record");
        }
        let ledger = self
            .settlement
            .debit(Debit {
                customer_id: &ticket.customer_id,
                ticket_id: &ticket.id,
                time_log_id: record.as_ref().map(|record| record.id.clone()),
                seconds: settlement.interval_seconds,
            })
            .await
            .map_err(|error| ApplicationError::from_settlement(error, &committed))?;
        Ok(SettledRun { record, ledger })
    }

    /// Wraps a failed audit write that followed a committed ticket write.
    pub fn audit_failed(error: impl std::fmt::Display) -> ApplicationError {
        ApplicationError::partial(WriteStep::AuditTrail, &[WriteStep::Ticket], error)
    }
}
