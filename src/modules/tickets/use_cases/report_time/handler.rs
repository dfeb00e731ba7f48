// Read side over tickets, the audit trail and customer balances.
//
// Boundaries
// - Never writes. Tenancy rules match the write side: foreign documents are reported missing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::modules::tickets::adapters::outbound::balance_settlement::BalanceSettlement;
use crate::modules::tickets::core::claim::{Claim, Role};
use crate::modules::tickets::core::customer::{Customer, RemainingTime};
use crate::modules::tickets::core::log_time::LogTime;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::core::time_log_record::TicketTimeLog;
use crate::modules::tickets::use_cases::context::TicketContext;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError};
use crate::modules::tickets::use_cases::report_time::projection::{
    ActiveSegment, active_segments, lifetime_active_seconds,
};
use crate::shared::infrastructure::document_store::{TicketCriteria, TicketRepository};

#[derive(Debug, Clone, Serialize)]
pub struct TimeReport {
    pub ticket_id: String,
    pub code: String,
    pub status: TicketStatus,
    pub log_time: LogTime,
    pub segments: Vec<ActiveSegment>,
    /// Audit records, oldest first.
    pub history: Vec<TicketTimeLog>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DayQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DayQuery {
    fn validate(&self) -> Result<(), ApplicationError> {
        if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(ApplicationError::Validation(vec![FieldError::new(
                "day",
                format!("{}-{}-{} is not a calendar day", self.year, self.month, self.day),
            )]));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub ticket_count: usize,
    pub active_seconds: i64,
    pub paused_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    pub customer_id: String,
    pub total: i64,
    pub used: i64,
    pub remaining: RemainingTime,
}

impl From<&Customer> for BalanceView {
    fn from(customer: &Customer) -> Self {
        let balance = customer.balance();
        Self {
            customer_id: customer.id.clone(),
            total: balance.time.total,
            used: balance.time.used,
            remaining: BalanceSettlement::remaining(customer),
        }
    }
}

pub struct TimeReports {
    ctx: TicketContext,
}

impl TimeReports {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn time_report(
        &self,
        actor: &Claim,
        ticket_id: &str,
    ) -> Result<TimeReport, ApplicationError> {
        let ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        if !visible_to(actor, &ticket.customer_id) {
            return Err(ApplicationError::not_found("ticket", ticket_id));
        }
        let history = self.ctx.audit.history(&ticket.id).await?;
        let Ticket {
            id, code, status, log_time, ..
        } = ticket;
        Ok(TimeReport {
            ticket_id: id,
            code,
            status,
            segments: active_segments(&log_time),
            log_time,
            history,
        })
    }

    /// Aggregates the company's tickets created on the given calendar day.
    pub async fn daily_summary(
        &self,
        actor: &Claim,
        query: DayQuery,
    ) -> Result<DailySummary, ApplicationError> {
        query.validate()?;
        let mut criteria = TicketCriteria::default().in_company(&actor.company_id);
        if actor.role == Role::Customer {
            criteria.customer_id = Some(actor.user_id.clone());
        }
        let tickets = self.ctx.store.fetch_tickets(&criteria).await?;
        let of_day = tickets.iter().filter(|ticket| {
            let detail = &ticket.detail_time;
            (detail.year, detail.month, detail.day) == (query.year, query.month, query.day)
        });

        let mut summary = DailySummary {
            year: query.year,
            month: query.month,
            day: query.day,
            ticket_count: 0,
            active_seconds: 0,
            paused_seconds: 0,
        };
        for ticket in of_day {
            summary.ticket_count += 1;
            summary.active_seconds += lifetime_active_seconds(&ticket.log_time);
            summary.paused_seconds += ticket.log_time.total_paused_duration_in_seconds;
        }
        Ok(summary)
    }

    pub async fn balance(
        &self,
        actor: &Claim,
        customer_id: &str,
    ) -> Result<BalanceView, ApplicationError> {
        let customer = self.ctx.load_customer(customer_id).await?;
        if customer.company_id != actor.company_id || !visible_to(actor, &customer.id) {
            return Err(ApplicationError::not_found("customer", customer_id));
        }
        Ok(BalanceView::from(&customer))
    }
}

/// Customers only ever see their own documents.
fn visible_to(actor: &Claim, customer_id: &str) -> bool {
    actor.role != Role::Customer || actor.user_id == customer_id
}
