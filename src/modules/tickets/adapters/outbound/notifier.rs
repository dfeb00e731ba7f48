// Side effects of status changes. Everything here runs detached; failures are
// logged by BackgroundTasks and never reach the request.

use std::sync::Arc;

use anyhow::Context;

use crate::modules::tickets::core::notification::Notification;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::shared::core::primitives::Clock;
use crate::shared::infrastructure::background::BackgroundTasks;
use crate::shared::infrastructure::document_store::{
    CounterRepository, CustomerRepository, DocumentStore, NotificationRepository,
};
use crate::shared::infrastructure::mailer::{Email, Mailer};

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn DocumentStore>,
    mailer: Arc<dyn Mailer>,
    tasks: Arc<BackgroundTasks>,
    clock: Arc<dyn Clock>,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        tasks: Arc<BackgroundTasks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            mailer,
            tasks,
            clock,
        }
    }

    /// Records an in-app notification and emails the customer.
    pub fn status_changed(&self, ticket: &Ticket, previous: TicketStatus, actor_name: &str) {
        let notification =
            Notification::status_changed(ticket, previous, actor_name, self.clock.now());

        let store = self.store.clone();
        let record = notification.clone();
        self.tasks.spawn("create_notification", async move {
            store
                .create_notification(&record)
                .await
                .context("storing status notification")
        });

        let store = self.store.clone();
        let mailer = self.mailer.clone();
        let customer_id = ticket.customer_id.clone();
        let token = ticket.token.clone();
        self.tasks.spawn("send_status_email", async move {
            let customer = store
                .fetch_one_customer(&customer_id)
                .await?
                .with_context(|| format!("customer {customer_id} not found"))?;
            let mut body = notification.message;
            if let Some(token) = token {
                body.push_str(&format!("\nConfirm the resolution with token {token}."));
            }
            mailer
                .send(Email {
                    to: customer.email,
                    subject: notification.title,
                    body,
                })
                .await
                .context("sending status email")
        });
    }

    pub fn agent_completed(&self, agent_id: &str) {
        let store = self.store.clone();
        let agent_id = agent_id.to_string();
        self.tasks.spawn("increment_agent_completed_tickets", async move {
            store
                .increment_agent_completed_tickets(&agent_id)
                .await
                .context("incrementing agent completed counter")
        });
    }

    pub fn count_status(&self, company_id: &str, status: TicketStatus) {
        let store = self.store.clone();
        let company_id = company_id.to_string();
        self.tasks.spawn("increment_company_ticket_counter", async move {
            store
                .increment_company_ticket_counter(&company_id, status)
                .await
                .context("incrementing company ticket counter")
        });
    }
}

#[cfg(test)]
mod notifier_tests {
    use super::*;
    use crate::shared::infrastructure::document_store::in_memory::{
        Collection, InMemoryDocumentStore,
    };
    use crate::shared::infrastructure::mailer::in_memory::InMemoryMailer;
    use crate::tests::fixtures::claims::agent;
    use crate::tests::fixtures::clock::ManualClock;
    use crate::tests::fixtures::customers::CustomerBuilder;
    use crate::tests::fixtures::tickets::TicketBuilder;
    use rstest::rstest;

    async fn notifier_over(
        store: InMemoryDocumentStore,
        mailer: InMemoryMailer,
    ) -> (Arc<InMemoryDocumentStore>, Arc<InMemoryMailer>, Arc<BackgroundTasks>, Notifier) {
        store.insert_customer(CustomerBuilder::new().build()).await;
        let store = Arc::new(store);
        let mailer = Arc::new(mailer);
        let tasks = Arc::new(BackgroundTasks::new());
        let clock = Arc::new(ManualClock::at(7));
        let notifier = Notifier::new(store.clone(), mailer.clone(), tasks.clone(), clock);
        (store, mailer, tasks, notifier)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_notify_and_email_the_customer_on_a_status_change() {
        let (store, mailer, tasks, notifier) =
            notifier_over(InMemoryDocumentStore::new(), InMemoryMailer::new()).await;
        let ticket = TicketBuilder::new()
            .status(TicketStatus::Resolve)
            .token("token-1")
            .build();

        notifier.status_changed(&ticket, TicketStatus::InProgress, &agent().name);
        tasks.drain().await;

        let notifications = store.notifications().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient_id, ticket.customer_id);
        assert_eq!(notifications[0].created_at, 7);
        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, CustomerBuilder::new().build().email);
        assert!(sent[0].body.contains("token-1"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_still_email_when_the_notification_write_fails() {
        let mut store = InMemoryDocumentStore::new();
        store.fail_writes_to(Collection::Notifications);
        let (store, mailer, tasks, notifier) = notifier_over(store, InMemoryMailer::new()).await;
        let ticket = TicketBuilder::new().build();

        notifier.status_changed(&ticket, TicketStatus::Open, &agent().name);
        tasks.drain().await;

        assert!(store.notifications().await.is_empty());
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_bump_agent_and_company_counters() {
        let (store, _, tasks, notifier) =
            notifier_over(InMemoryDocumentStore::new(), InMemoryMailer::new()).await;

        notifier.agent_completed("agent-0001");
        notifier.count_status("company-0001", TicketStatus::Closed);
        notifier.count_status("company-0001", TicketStatus::Closed);
        tasks.drain().await;

        assert_eq!(store.agent_completed_tickets("agent-0001").await, 1);
        assert_eq!(store.company_ticket_counter("company-0001", TicketStatus::Closed).await, 2);
    }
}
