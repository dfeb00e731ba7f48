// TimeLogEngine: start, pause, resume, stop and manual edit of a ticket's log.
//
// Each operation loads the ticket within the actor's company, applies the pure
// transition, writes the ticket (compare-and-swap), then the audit trail, then
// settles the balance when an active interval closed.

use tracing::info;

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::policy::PolicyAction;
use crate::modules::tickets::core::time_log_record::{ActivityType, TicketTimeLog};
use crate::modules::tickets::use_cases::context::{TicketContext, TicketOutcome};
use crate::modules::tickets::use_cases::errors::ApplicationError;
use crate::modules::tickets::use_cases::track_time::command::EditTimeTrack;

pub struct TimeLogEngine {
    ctx: TicketContext,
}

impl TimeLogEngine {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn start(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let previous = ticket.status;
        ticket.start_log(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        let record = self
            .ctx
            .audit
            .open(&ticket, ActivityType::StartLog, Some(&actor.user_id), now)
            .await
            .map_err(TicketContext::audit_failed)?;
        if previous != ticket.status {
            self.ctx.notifier.status_changed(&ticket, previous, &actor.name);
        }
        info!(ticket_id = %ticket.id, actor = %actor.user_id, from = %previous, "time log started");
        Ok(TicketOutcome {
            ticket,
            time_log: Some(record),
        })
    }

    pub async fn pause(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let settlement = ticket.pause_log(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        let settled = self.ctx.settle_run(&ticket, settlement).await?;
        info!(
            ticket_id = %ticket.id,
            actor = %actor.user_id,
            interval_seconds = settlement.interval_seconds,
            "time log paused"
        );
        Ok(TicketOutcome {
            ticket,
            time_log: settled.record,
        })
    }

    pub async fn resume(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let customer = self.ctx.load_customer(&ticket.customer_id).await?;
        self.ctx
            .policy
            .check(PolicyAction::ResumeLog, actor, &ticket, &customer, now)
            .into_result()?;
        let paused_seconds = ticket.resume_log(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        let record = self
            .ctx
            .audit
            .open(&ticket, ActivityType::ResumeLog, Some(&actor.user_id), now)
            .await
            .map_err(TicketContext::audit_failed)?;
        info!(ticket_id = %ticket.id, actor = %actor.user_id, paused_seconds, "time log resumed");
        Ok(TicketOutcome {
            ticket,
            time_log: Some(record),
        })
    }

    /// Finishes the run without touching the balance.
    pub async fn stop(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TicketOutcome, ApplicationError> {
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let run = ticket.stop_log(now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        self.ctx
            .audit
            .close(&ticket, now, run.interval_seconds)
            .await
            .map_err(TicketContext::audit_failed)?;
        let created_by = Some(actor.user_id.clone());
        let run_start = ticket.log_time.start_at.unwrap_or(now);
        let entry = TicketTimeLog::snapshot(&ticket, ActivityType::StopLog, created_by, now)
            .finished(run_start, Some(now), run.run_seconds);
        let record = self
            .ctx
            .audit
            .record(entry)
            .await
            .map_err(TicketContext::audit_failed)?;
        info!(
            ticket_id = %ticket.id,
            actor = %actor.user_id,
            run_seconds = run.run_seconds,
            "time log stopped"
        );
        Ok(TicketOutcome {
            ticket,
            time_log: Some(record),
        })
    }

    /// Overwrites the tracked total. The balance is left untouched.
    pub async fn edit_manual(
        &self,
        actor: &Claim,
        ticket_id: &str,
        command: EditTimeTrack,
    ) -> Result<TicketOutcome, ApplicationError> {
        let duration = command.validate()?;
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let total = ticket.edit_log_manually(duration, now)?;
        let ticket = self.ctx.save_ticket(&ticket).await?;
        let created_by = Some(actor.user_id.clone());
        let entry = TicketTimeLog::snapshot(&ticket, ActivityType::EditTimeTrack, created_by, now)
            .finished(now, Some(now), total)
            .manual();
        let record = self
            .ctx
            .audit
            .record(entry)
            .await
            .map_err(TicketContext::audit_failed)?;
        info!(
            ticket_id = %ticket.id,
            actor = %actor.user_id,
            total_seconds = total,
            "time track edited manually"
        );
        Ok(TicketOutcome {
            ticket,
            time_log: Some(record),
        })
    }
}
