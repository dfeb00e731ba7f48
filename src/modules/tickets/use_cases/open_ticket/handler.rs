use tracing::info;

use crate::modules::tickets::core::claim::{Claim, Role};
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::core::time_log_record::ActivityType;
use crate::modules::tickets::use_cases::context::{TicketContext, TicketOutcome};
use crate::modules::tickets::use_cases::errors::ApplicationError;
use crate::modules::tickets::use_cases::open_ticket::command::OpenTicket;
use crate::shared::core::primitives::new_id;
use crate::shared::infrastructure::document_store::TicketRepository;

pub struct OpenTicketHandler {
    ctx: TicketContext,
}

impl OpenTicketHandler {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        actor: &Claim,
        command: OpenTicket,
    ) -> Result<TicketOutcome, ApplicationError> {
        let draft = command.into_draft(actor)?;
        let customer = self.ctx.load_customer(&draft.customer_id).await?;
        let foreign = customer.company_id != actor.company_id
            || (actor.role == Role::Customer && customer.id != actor.user_id);
        if foreign {
            return Err(ApplicationError::not_found("customer", &draft.customer_id));
        }

        let now = self.ctx.clock.now();
        let ticket = Ticket::open(new_id(), draft, now);
        self.ctx.store.create_ticket(&ticket).await?;
        let record = self
            .ctx
            .audit
            .open(&ticket, ActivityType::TicketOpen, Some(&actor.user_id), now)
            .await
            .map_err(TicketContext::audit_failed)?;
        self.ctx.notifier.count_status(&ticket.company_id, TicketStatus::Open);
        info!(
            ticket_id = %ticket.id,
            customer_id = %ticket.customer_id,
            code = %ticket.code,
            "ticket opened"
        );
        Ok(TicketOutcome {
            ticket,
            time_log: Some(record),
        })
    }
}
