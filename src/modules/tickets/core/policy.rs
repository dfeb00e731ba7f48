// PolicyGate: the single place where role, assignment and subscription rules
// are checked before any state mutation.
//
// Boundaries
// - Pure. Receives already-fetched ticket and customer, returns a decision.

use crate::modules::tickets::core::claim::{Claim, Role};
use crate::modules::tickets::core::customer::Customer;
use crate::modules::tickets::core::errors::TicketError;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::shared::core::primitives::EpochMillis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    ResumeLog,
    ChangeStatus { to: TicketStatus },
    Reopen,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Denial {
    #[error("you are not assigned to this ticket")]
    NotAssigned,

    #[error(transparent)]
    Transition(TicketError),

    #[error("only agents can change the ticket status")]
    StatusChangeRequiresStaff,

    #[error("customer has no active subscription")]
    SubscriptionInactive,

    #[error("remaining balance of {remaining}s is below the required {required}s")]
    InsufficientBalance { remaining: i64, required: i64 },

    #[error("only administrators can reconcile balances")]
    AdminOnly,
}

impl Denial {
    /// Status-table denials are state conflicts rather than authorization gaps.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, Denial::Transition(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial),
        }
    }
}

/// Target statuses a comment may request from each status.
pub fn comment_targets(from: TicketStatus) -> &'static [TicketStatus] {
    match from {
        TicketStatus::Open => &[TicketStatus::Open, TicketStatus::InProgress],
        TicketStatus::InProgress => &[TicketStatus::InProgress, TicketStatus::Resolve],
        TicketStatus::Resolve => &[TicketStatus::InProgress, TicketStatus::Resolve],
        TicketStatus::Closed | TicketStatus::Cancel => &[],
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PolicyGate {
    min_reopen_credit_seconds: i64,
}

impl PolicyGate {
    pub fn new(min_reopen_credit_seconds: i64) -> Self {
        Self {
            min_reopen_credit_seconds,
        }
    }

    pub fn check(
        &self,
        action: PolicyAction,
        actor: &Claim,
        ticket: &Ticket,
        customer: &Customer,
        now: EpochMillis,
    ) -> Decision {
        match action {
            PolicyAction::ResumeLog => {
                if customer.is_need_balance && !ticket.is_assigned(&actor.user_id) {
                    return Decision::Deny(Denial::NotAssigned);
                }
                Decision::Allow
            }
            PolicyAction::ChangeStatus { to } => {
                self.check_status_change(actor, ticket, customer, to, now)
            }
            PolicyAction::Reopen => {
                if actor.role == Role::Customer && customer.is_need_balance {
                    return require_credit(customer, self.min_reopen_credit_seconds, now);
                }
                Decision::Allow
            }
        }
    }

    /// Operator-only actions that are not tied to a single ticket.
    pub fn check_admin(&self, actor: &Claim) -> Decision {
        if actor.role != Role::Admin {
            return Decision::Deny(Denial::AdminOnly);
        }
        Decision::Allow
    }

    fn check_status_change(
        &self,
        actor: &Claim,
        ticket: &Ticket,
        customer: &Customer,
        to: TicketStatus,
        now: EpochMillis,
    ) -> Decision {
        let from = ticket.status;
        if !comment_targets(from).contains(&to) {
            return Decision::Deny(Denial::Transition(TicketError::StatusNotAllowed { from, to }));
        }
        if to == from {
            return Decision::Allow;
        }
        if !actor.role.is_staff() {
            return Decision::Deny(Denial::StatusChangeRequiresStaff);
        }
        if to == TicketStatus::InProgress && customer.is_need_balance {
            return require_credit(customer, 1, now);
        }
        Decision::Allow
    }
}

fn require_credit(customer: &Customer, required: i64, now: EpochMillis) -> Decision {
    match customer.usable_remaining_seconds(now) {
        None => Decision::Deny(Denial::SubscriptionInactive),
        Some(remaining) if remaining < required => {
            Decision::Deny(Denial::InsufficientBalance { remaining, required })
        }
        Some(_) => Decision::Allow,
    }
}
