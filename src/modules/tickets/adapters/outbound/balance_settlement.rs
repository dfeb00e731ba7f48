// Debits tracked time from a customer's prepaid balance.
//
// Two independent writes, customer patch first and ledger row second. Nothing is
// rolled back; a failure names the write that failed so the caller can report it
// and the reconciliation job can repair it later.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::modules::tickets::core::customer::{Customer, CustomerBalanceHistory, RemainingTime};
use crate::shared::core::primitives::Clock;
use crate::shared::infrastructure::document_store::{
    BalanceHistoryRepository, CustomerPatch, CustomerRepository, DocumentStore, StoreError,
};

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("customer lookup failed: {0}")]
    CustomerLookup(StoreError),

    #[error("customer {0} not found")]
    CustomerMissing(String),

    #[error("customer balance write failed: {0}")]
    CustomerWrite(StoreError),

    #[error("balance ledger write failed: {0}")]
    LedgerWrite(StoreError),
}

/// What to debit, and which audit record the debit settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debit<'a> {
    pub customer_id: &'a str,
    pub ticket_id: &'a str,
    pub time_log_id: Option<String>,
    pub seconds: i64,
}

#[derive(Clone)]
pub struct BalanceSettlement {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl BalanceSettlement {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns the ledger row written, or `None` when the customer is not
    /// balance-constrained or there is nothing to debit.
    pub async fn debit(
        &self,
        debit: Debit<'_>,
    ) -> Result<Option<CustomerBalanceHistory>, SettlementError> {
        if debit.seconds <= 0 {
            return Ok(None);
        }
        let customer = self
            .store
            .fetch_one_customer(debit.customer_id)
            .await
            .map_err(SettlementError::CustomerLookup)?
            .ok_or_else(|| SettlementError::CustomerMissing(debit.customer_id.to_string()))?;
        if !customer.is_need_balance {
            debug!(
                customer_id = %customer.id,
                "customer is not balance-constrained, skipping debit"
            );
            return Ok(None);
        }

        let used = customer.balance().time.used + debit.seconds;
        self.store
            .update_one_customer(
                &customer.id,
                &CustomerPatch {
                    balance_time_used: Some(used),
                },
            )
            .await
            .map_err(SettlementError::CustomerWrite)?;

        let row = CustomerBalanceHistory::ticket_debit(
            &customer.id,
            debit.ticket_id,
            debit.time_log_id,
            debit.seconds,
            self.clock.now(),
        );
        self.store
            .create_customer_balance_history(&row)
            .await
            .map_err(SettlementError::LedgerWrite)?;

        info!(
            customer_id = %customer.id,
            ticket_id = %debit.ticket_id,
            seconds = debit.seconds,
            used,
            "balance debited"
        );
        Ok(Some(row))
    }

    pub fn remaining(customer: &Customer) -> RemainingTime {
        customer.balance().remaining()
    }
}
