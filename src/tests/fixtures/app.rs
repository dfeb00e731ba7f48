// Wires the ticket use cases over in-memory adapters and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;

use crate::modules::tickets::adapters::inbound::claim_extractor::{
    ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLE_HEADER, COMPANY_ID_HEADER,
};
use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::customer::Customer;
use crate::modules::tickets::core::policy::PolicyGate;
use crate::modules::tickets::core::ticket::Ticket;
use crate::modules::tickets::core::time_log_record::{ActivityType, TicketTimeLog};
use crate::modules::tickets::use_cases::context::TicketContext;
use crate::shared::core::primitives::EpochMillis;
use crate::shared::infrastructure::background::BackgroundTasks;
use crate::shared::infrastructure::document_store::in_memory::InMemoryDocumentStore;
use crate::shared::infrastructure::document_store::{
    CustomerRepository, TicketCriteria, TicketRepository,
};
use crate::shared::infrastructure::mailer::in_memory::InMemoryMailer;
use crate::shell::state::AppState;
use crate::tests::fixtures::claims::{admin, agent, customer_claim};
use crate::tests::fixtures::clock::ManualClock;
use crate::tests::fixtures::customers::CUSTOMER_ID;
use crate::tests::fixtures::tickets::TICKET_ID;

/// 2023-11-14T22:13:20Z, a Tuesday.
pub const T0: EpochMillis = 1_700_000_000_000;

pub struct TestApp {
    pub store: Arc<InMemoryDocumentStore>,
    pub mailer: Arc<InMemoryMailer>,
    pub tasks: Arc<BackgroundTasks>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(InMemoryDocumentStore::new())
    }

    pub fn with_store(store: InMemoryDocumentStore) -> Self {
        Self {
            store: Arc::new(store),
            mailer: Arc::new(InMemoryMailer::new()),
            tasks: Arc::new(BackgroundTasks::new()),
            clock: Arc::new(ManualClock::at(T0)),
        }
    }

    pub fn ctx(&self) -> TicketContext {
        TicketContext::new(
            self.store.clone(),
            self.mailer.clone(),
            self.tasks.clone(),
            self.clock.clone(),
            PolicyGate::new(60),
        )
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.ctx(), Duration::from_secs(5))
    }

    pub async fn seed_customer(&self, customer: Customer) {
        self.store.insert_customer(customer).await;
    }

    pub async fn seed_ticket(&self, ticket: Ticket) {
        self.store.insert_ticket(ticket).await;
    }

    pub async fn customer(&self) -> Customer {
        self.store.fetch_one_customer(CUSTOMER_ID).await.unwrap().unwrap()
    }

    pub async fn ticket(&self) -> Ticket {
        self.store
            .fetch_one_ticket(&TicketCriteria::by_id(TICKET_ID))
            .await
            .unwrap()
            .unwrap()
    }

    /// Opens an audit record for the fixture ticket as the fixture agent.
    pub async fn audit_open(&self, activity: ActivityType, at: EpochMillis) -> TicketTimeLog {
        self.ctx()
            .audit
            .open(&self.ticket().await, activity, Some(&agent().user_id), at)
            .await
            .unwrap()
    }
}

fn request_as(claim: Claim, method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, claim.user_id)
        .header(ACTOR_ROLE_HEADER, claim.role.to_string())
        .header(ACTOR_NAME_HEADER, claim.name)
        .header(COMPANY_ID_HEADER, claim.company_id)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

pub fn agent_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    request_as(agent(), method, uri, body)
}

pub fn admin_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    request_as(admin(), method, uri, body)
}

pub fn customer_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    request_as(customer_claim(), method, uri, body)
}
