use crate::modules::tickets::core::log_time::{LogTime, LogTimeStatus};
use crate::modules::tickets::core::ticket::{DetailTime, Priority, Ticket, TicketStatus};
use crate::shared::core::primitives::EpochMillis;
use crate::tests::fixtures::app::T0;
use crate::tests::fixtures::customers::{COMPANY_ID, CUSTOMER_ID};

pub const TICKET_ID: &str = "ticket-0001";

pub struct TicketBuilder {
    inner: Ticket,
}

impl TicketBuilder {
    /// Open ticket created at `T0`, assigned to the fixture agent, log not started.
    pub fn new() -> Self {
        Self {
            inner: Ticket {
                id: TICKET_ID.into(),
                company_id: COMPANY_ID.into(),
                customer_id: CUSTOMER_ID.into(),
                project_id: None,
                category_id: None,
                subject: "Cannot reach the VPN".into(),
                content: "Times out after login".into(),
                code: "TCK-0001".into(),
                status: TicketStatus::Open,
                priority: Priority::Medium,
                assigned_agents: vec!["agent-0001".into()],
                log_time: LogTime::default(),
                detail_time: DetailTime::from_millis(T0),
                parent_id: None,
                completed_by: None,
                reminder_sent: false,
                token: None,
                closed_at: None,
                created_at: T0,
                updated_at: T0,
                version: 0,
            },
        }
    }

    pub fn status(mut self, v: TicketStatus) -> Self {
        self.inner.status = v;
        self
    }

    /// In-progress ticket whose log has been running since `start_at`.
    pub fn running_since(mut self, start_at: EpochMillis) -> Self {
        self.inner.status = TicketStatus::InProgress;
        self.inner.log_time = LogTime {
            start_at: Some(start_at),
            status: LogTimeStatus::Running,
            ..LogTime::default()
        };
        self
    }

    pub fn reminder_sent(mut self, v: bool) -> Self {
        self.inner.reminder_sent = v;
        self
    }

    pub fn token(mut self, v: impl Into<String>) -> Self {
        self.inner.token = Some(v.into());
        self
    }

    pub fn assigned(mut self, agents: Vec<&str>) -> Self {
        self.inner.assigned_agents = agents.into_iter().map(str::to_string).collect();
        self
    }

    pub fn build(self) -> Ticket {
        self.inner
    }
}
