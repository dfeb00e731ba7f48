// Explicit status changes outside the comment workflow: close, cancel, reopen,
// and the single-use token close that customers reach from the resolution email.

use tracing::info;

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::policy::PolicyAction;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::use_cases::context::{TicketContext, TicketOutcome};
use crate::modules::tickets::use_cases::errors::ApplicationError;
use crate::shared::infrastructure::document_store::{TicketCriteria, TicketRepository};

pub struct ChangeTicketStatusHandler {
    ctx: TicketContext,
}

impl ChangeTicketStatusHandler {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn close(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        self.close_loaded(ticket, &actor.name).await
    }

    /// Closes the ticket owning `token`. The token is consumed by the close.
    pub async fn close_by_token(&self, token: &str) -> Result<TicketOutcome, ApplicationError> {
        let mut ticket = self
            .ctx
            .store
            .fetch_one_ticket(&TicketCriteria::by_token(token))
            .await?
            .ok_or_else(|| ApplicationError::not_found("ticket", "for the given token"))?;
        ticket.consume_token();
        self.close_loaded(ticket, "customer").await
    }

    pub async fn cancel(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let previous = ticket.status;
        ticket.cancel(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        self.announce(&ticket, previous, &actor.name);
        Ok(TicketOutcome {
            ticket,
            time_log: None,
        })
    }

    pub async fn reopen(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let previous = ticket.status;
        ticket.reopen(now)?;
        let customer = self.ctx.load_customer(&ticket.customer_id).await?;
        self.ctx
            .policy
            .check(PolicyAction::Reopen, actor, &ticket, &customer, now)
            .into_result()?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        self.announce(&ticket, previous, &actor.name);
        Ok(TicketOutcome {
            ticket,
            time_log: None,
        })
    }

    async fn close_loaded(
        &self,
        mut ticket: Ticket,
        actor_name: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let previous = ticket.status;
        let settlement = ticket.close(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        let time_log = match settlement {
            Some(settlement) => self.ctx.settle_run(&ticket, settlement).await?.record,
            None => None,
        };
        self.announce(&ticket, previous, actor_name);
        Ok(TicketOutcome { ticket, time_log })
    }

    fn announce(&self, ticket: &Ticket, previous: TicketStatus, actor_name: &str) {
        self.ctx.notifier.status_changed(ticket, previous, actor_name);
        self.ctx.notifier.count_status(&ticket.company_id, ticket.status);
        info!(
            ticket_id = %ticket.id,
            from = %previous,
            to = %ticket.status,
            "ticket status changed"
        );
    }
}
