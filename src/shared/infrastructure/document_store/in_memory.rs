// In memory implementation of the document store ports.
//
// Purpose
// - Support handler tests and local development without a database.
//
// Responsibilities
// - Keep each collection in memory behind its own lock.
// - Enforce compare-and-swap on ticket versions.
// - Simulate outages, whole-store or per collection, for failure-path tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::modules::tickets::core::comment::TicketComment;
use crate::modules::tickets::core::customer::{Customer, CustomerBalanceHistory};
use crate::modules::tickets::core::notification::Notification;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::core::time_log_record::TicketTimeLog;
use crate::shared::infrastructure::document_store::{
    BalanceHistoryCriteria, BalanceHistoryRepository, CommentRepository, CounterRepository,
    CustomerPatch, CustomerRepository, NotificationRepository, SortOrder, StoreError,
    TicketCriteria, TicketRepository, TicketTimeLogCriteria, TicketTimeLogRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tickets,
    TicketTimeLogs,
    Customers,
    BalanceHistory,
    Notifications,
    Comments,
    Counters,
}

impl Collection {
    fn name(&self) -> &'static str {
        match self {
            Collection::Tickets => "tickets",
            Collection::TicketTimeLogs => "ticket_time_logs",
            Collection::Customers => "customers",
            Collection::BalanceHistory => "customer_balance_history",
            Collection::Notifications => "notifications",
            Collection::Comments => "ticket_comments",
            Collection::Counters => "counters",
        }
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    tickets: RwLock<HashMap<String, Ticket>>,
    time_logs: RwLock<Vec<TicketTimeLog>>,
    customers: RwLock<HashMap<String, Customer>>,
    balance_history: RwLock<Vec<CustomerBalanceHistory>>,
    notifications: RwLock<Vec<Notification>>,
    comments: RwLock<Vec<TicketComment>>,
    agent_counters: RwLock<HashMap<String, i64>>,
    company_counters: RwLock<HashMap<(String, TicketStatus), i64>>,
    is_offline: bool,
    failing_writes: HashSet<Collection>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Makes every write to `collection` fail while reads keep working.
    pub fn fail_writes_to(&mut self, collection: Collection) {
        self.failing_writes.insert(collection);
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.customers
            .write()
            .await
            .insert(customer.id.clone(), customer);
    }

    pub async fn insert_ticket(&self, ticket: Ticket) {
        self.tickets.write().await.insert(ticket.id.clone(), ticket);
    }

    pub async fn time_logs(&self) -> Vec<TicketTimeLog> {
        self.time_logs.read().await.clone()
    }

    pub async fn balance_history(&self) -> Vec<CustomerBalanceHistory> {
        self.balance_history.read().await.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    pub async fn comments(&self) -> Vec<TicketComment> {
        self.comments.read().await.clone()
    }

    pub async fn agent_completed_tickets(&self, agent_id: &str) -> i64 {
        self.agent_counters
            .read()
            .await
            .get(agent_id)
            .copied()
            .unwrap_or(0)
    }

    pub async fn company_ticket_counter(&self, company_id: &str, status: TicketStatus) -> i64 {
        self.company_counters
            .read()
            .await
            .get(&(company_id.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    fn ensure_readable(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Document store offline".into()));
        }
        Ok(())
    }

    fn ensure_writable(&self, collection: Collection) -> Result<(), StoreError> {
        self.ensure_readable()?;
        if self.failing_writes.contains(&collection) {
            return Err(StoreError::Backend(format!(
                "{} rejected the write",
                collection.name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for InMemoryDocumentStore {
    async fn fetch_one_ticket(
        &self,
        criteria: &TicketCriteria,
    ) -> Result<Option<Ticket>, StoreError> {
        self.ensure_readable()?;
        let guard = self.tickets.read().await;
        Ok(guard.values().find(|ticket| criteria.matches(ticket)).cloned())
    }

    async fn fetch_tickets(&self, criteria: &TicketCriteria) -> Result<Vec<Ticket>, StoreError> {
        self.ensure_readable()?;
        let guard = self.tickets.read().await;
        let mut tickets: Vec<Ticket> = guard
            .values()
            .filter(|ticket| criteria.matches(ticket))
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| ticket.created_at);
        Ok(tickets)
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Tickets)?;
        self.tickets
            .write()
            .await
            .insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        self.ensure_writable(Collection::Tickets)?;
        let mut guard = self.tickets.write().await;
        let stored = guard.get_mut(&ticket.id).ok_or_else(|| StoreError::Missing {
            collection: Collection::Tickets.name(),
            id: ticket.id.clone(),
        })?;
        if stored.version != ticket.version {
            return Err(StoreError::VersionMismatch {
                expected: ticket.version,
                actual: stored.version,
            });
        }
        let mut next = ticket.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl TicketTimeLogRepository for InMemoryDocumentStore {
    async fn fetch_one_ticket_time_log(
        &self,
        criteria: &TicketTimeLogCriteria,
    ) -> Result<Option<TicketTimeLog>, StoreError> {
        Ok(self.fetch_ticket_time_logs(criteria).await?.into_iter().next())
    }

    async fn fetch_ticket_time_logs(
        &self,
        criteria: &TicketTimeLogCriteria,
    ) -> Result<Vec<TicketTimeLog>, StoreError> {
        self.ensure_readable()?;
        let guard = self.time_logs.read().await;
        let mut records: Vec<TicketTimeLog> = guard
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();
        // Insertion order breaks ties between records created in the same millisecond.
        match criteria.sort {
            SortOrder::CreatedAtAsc => records.sort_by_key(|record| record.created_at),
            SortOrder::CreatedAtDesc => {
                records.reverse();
                records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
        }
        Ok(records)
    }

    async fn create_ticket_time_log(&self, record: &TicketTimeLog) -> Result<(), StoreError> {
        self.ensure_writable(Collection::TicketTimeLogs)?;
        self.time_logs.write().await.push(record.clone());
        Ok(())
    }

    async fn update_ticket_time_log(&self, record: &TicketTimeLog) -> Result<(), StoreError> {
        self.ensure_writable(Collection::TicketTimeLogs)?;
        let mut guard = self.time_logs.write().await;
        let stored = guard
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_else(|| StoreError::Missing {
                collection: Collection::TicketTimeLogs.name(),
                id: record.id.clone(),
            })?;
        *stored = record.clone();
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryDocumentStore {
    async fn fetch_one_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        self.ensure_readable()?;
        Ok(self.customers.read().await.get(customer_id).cloned())
    }

    async fn update_one_customer(
        &self,
        customer_id: &str,
        patch: &CustomerPatch,
    ) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Customers)?;
        let mut guard = self.customers.write().await;
        let customer = guard.get_mut(customer_id).ok_or_else(|| StoreError::Missing {
            collection: Collection::Customers.name(),
            id: customer_id.to_string(),
        })?;
        if let (Some(used), Some(subscription)) =
            (patch.balance_time_used, customer.subscription.as_mut())
        {
            subscription.balance.time.used = used;
        }
        Ok(())
    }
}

#[async_trait]
impl BalanceHistoryRepository for InMemoryDocumentStore {
    async fn create_customer_balance_history(
        &self,
        row: &CustomerBalanceHistory,
    ) -> Result<(), StoreError> {
        self.ensure_writable(Collection::BalanceHistory)?;
        self.balance_history.write().await.push(row.clone());
        Ok(())
    }

    async fn fetch_customer_balance_history(
        &self,
        criteria: &BalanceHistoryCriteria,
    ) -> Result<Vec<CustomerBalanceHistory>, StoreError> {
        self.ensure_readable()?;
        let guard = self.balance_history.read().await;
        Ok(guard.iter().filter(|row| criteria.matches(row)).cloned().collect())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryDocumentStore {
    async fn create_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Notifications)?;
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryDocumentStore {
    async fn create_comment(&self, comment: &TicketComment) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Comments)?;
        self.comments.write().await.push(comment.clone());
        Ok(())
    }
}

#[async_trait]
impl CounterRepository for InMemoryDocumentStore {
    async fn increment_agent_completed_tickets(&self, agent_id: &str) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Counters)?;
        *self
            .agent_counters
            .write()
            .await
            .entry(agent_id.to_string())
            .or_default() += 1;
        Ok(())
    }

    async fn increment_company_ticket_counter(
        &self,
        company_id: &str,
        status: TicketStatus,
    ) -> Result<(), StoreError> {
        self.ensure_writable(Collection::Counters)?;
        *self
            .company_counters
            .write()
            .await
            .entry((company_id.to_string(), status))
            .or_default() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod in_memory_document_store_tests {
    use super::*;
    use crate::modules::tickets::core::time_log_record::ActivityType;
    use crate::tests::fixtures::customers::CustomerBuilder;
    use crate::tests::fixtures::tickets::TicketBuilder;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_bump_the_version_on_update(store: InMemoryDocumentStore) {
        let ticket = TicketBuilder::new().build();
        store.create_ticket(&ticket).await.unwrap();
        let updated = store.update_ticket(&ticket).await.unwrap();
        assert_eq!(updated.version, ticket.version + 1);
        let fetched = store
            .fetch_one_ticket(&TicketCriteria::by_id(&ticket.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.version, updated.version);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_stale_ticket_write(store: InMemoryDocumentStore) {
        let ticket = TicketBuilder::new().build();
        store.create_ticket(&ticket).await.unwrap();
        store.update_ticket(&ticket).await.unwrap();
        let result = store.update_ticket(&ticket).await;
        match result {
            Err(StoreError::VersionMismatch { expected, actual }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected VersionMismatch, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_scope_ticket_lookups_to_the_company(store: InMemoryDocumentStore) {
        let ticket = TicketBuilder::new().build();
        store.create_ticket(&ticket).await.unwrap();
        let other_company = store
            .fetch_one_ticket(&TicketCriteria::by_id(&ticket.id).in_company("company-other"))
            .await
            .unwrap();
        assert!(other_company.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_the_most_recent_time_log_first(store: InMemoryDocumentStore) {
        let ticket = TicketBuilder::new().build();
        for (at, activity) in [
            (1_000, ActivityType::TicketOpen),
            (2_000, ActivityType::StartLog),
            (2_000, ActivityType::StopLog),
        ] {
            let record = TicketTimeLog::snapshot(&ticket, activity, None, at);
            store.create_ticket_time_log(&record).await.unwrap();
        }
        let latest = store
            .fetch_one_ticket_time_log(&TicketTimeLogCriteria::latest_for_ticket(&ticket.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.activity_type, ActivityType::StopLog);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_patch_only_the_used_balance(store: InMemoryDocumentStore) {
        let customer = CustomerBuilder::new().subscription(true, None, 3600, 0).build();
        store.insert_customer(customer.clone()).await;
        store
            .update_one_customer(
                &customer.id,
                &CustomerPatch {
                    balance_time_used: Some(420),
                },
            )
            .await
            .unwrap();
        let stored = store.fetch_one_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(stored.balance().time.used, 420);
        assert_eq!(stored.balance().time.total, 3600);
        assert_eq!(stored.email, customer.email);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_every_call_while_offline(mut store: InMemoryDocumentStore) {
        store.toggle_offline();
        let result = store.fetch_one_customer("c-1").await;
        assert!(result.unwrap_err().to_string().contains("Document store offline"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_writes_to_a_single_collection(mut store: InMemoryDocumentStore) {
        store.fail_writes_to(Collection::BalanceHistory);
        let row = CustomerBalanceHistory::ticket_debit("c-1", "t-1", None, 10, 0);
        let result = store.create_customer_balance_history(&row).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("customer_balance_history rejected the write")
        );
        let criteria = BalanceHistoryCriteria::default();
        assert!(store.fetch_customer_balance_history(&criteria).await.is_ok());
    }
}
