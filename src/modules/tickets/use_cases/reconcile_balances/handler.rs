// Replays the audit trail of a customer's tickets against the balance ledger
// and debits intervals that were closed but never (fully) settled.
//
// Invariants
// - Missing = record duration - sum of ledger `out` rows referencing that record.
// - A second run over the same trail debits nothing.

use serde::Serialize;
use tracing::info;

use crate::modules::tickets::adapters::outbound::balance_settlement::Debit;
use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::context::TicketContext;
use crate::modules::tickets::use_cases::errors::ApplicationError;
use crate::shared::infrastructure::document_store::{
    BalanceHistoryCriteria, BalanceHistoryRepository, TicketCriteria, TicketRepository,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub customer_id: String,
    pub debited_records: usize,
    pub debited_seconds: i64,
}

pub struct BalanceReconciler {
    ctx: TicketContext,
}

impl BalanceReconciler {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn reconcile(
        &self,
        actor: &Claim,
        customer_id: &str,
    ) -> Result<ReconcileReport, ApplicationError> {
        self.ctx.policy.check_admin(actor).into_result()?;
        let customer = self.ctx.load_customer(customer_id).await?;
        if customer.company_id != actor.company_id {
            return Err(ApplicationError::not_found("customer", customer_id));
        }

        let criteria = TicketCriteria {
            customer_id: Some(customer.id.clone()),
            ..TicketCriteria::default()
        }
        .in_company(&customer.company_id);
        let tickets = self.ctx.store.fetch_tickets(&criteria).await?;

        let mut report = ReconcileReport {
            customer_id: customer.id.clone(),
            ..ReconcileReport::default()
        };
        for ticket in &tickets {
            for record in self.ctx.audit.settleable(&ticket.id).await? {
                let settled: i64 = self
                    .ctx
                    .store
                    .fetch_customer_balance_history(&BalanceHistoryCriteria {
                        customer_id: Some(customer.id.clone()),
                        time_log_id: Some(record.id.clone()),
                        ..BalanceHistoryCriteria::default()
                    })
                    .await?
                    .iter()
                    .map(|row| row.debit)
                    .sum();
                let missing = record.duration_in_seconds - settled;
                if missing <= 0 {
                    continue;
                }
                let debited = self
                    .ctx
                    .settlement
                    .debit(Debit {
                        customer_id: &customer.id,
                        ticket_id: &ticket.id,
                        time_log_id: Some(record.id.clone()),
                        seconds: missing,
                    })
                    .await
                    .map_err(|error| ApplicationError::from_settlement(error, &[]))?;
                if debited.is_some() {
                    report.debited_records += 1;
                    report.debited_seconds += missing;
                }
            }
        }

        info!(
            customer_id = %report.customer_id,
            tickets = tickets.len(),
            debited_records = report.debited_records,
            debited_seconds = report.debited_seconds,
            "balances reconciled"
        );
        Ok(report)
    }
}
