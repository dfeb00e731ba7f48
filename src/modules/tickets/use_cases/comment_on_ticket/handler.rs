// TicketCommentWorkflow: a comment may carry a target status, which drives the
// ticket status machine and, through it, the time log.
//
// - Open | Resolve -> InProgress assigns the commenting agent and starts the log.
// - InProgress -> Resolve settles the running log and issues a confirmation token.

use serde::Serialize;
use tracing::info;

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::comment::{StatusChange, TicketComment};
use crate::modules::tickets::core::errors::TicketError;
use crate::modules::tickets::core::log_time::Settlement;
use crate::modules::tickets::core::policy::PolicyAction;
use crate::modules::tickets::core::ticket::{Ticket, TicketStatus};
use crate::modules::tickets::core::time_log_record::{ActivityType, TicketTimeLog};
use crate::modules::tickets::use_cases::comment_on_ticket::command::AddComment;
use crate::modules::tickets::use_cases::context::TicketContext;
use crate::modules::tickets::use_cases::errors::{ApplicationError, WriteStep};
use crate::shared::core::primitives::{EpochMillis, new_id};
use crate::shared::infrastructure::document_store::CommentRepository;

#[derive(Debug, Clone, Serialize)]
pub struct CommentOutcome {
    pub ticket: Ticket,
    pub comment: TicketComment,
    pub time_log: Option<TicketTimeLog>,
}

enum Transition {
    None,
    StartWork,
    Resolve(Option<Settlement>),
}

pub struct TicketCommentWorkflow {
    ctx: TicketContext,
}

impl TicketCommentWorkflow {
    pub fn new(ctx: TicketContext) -> Self {
        Self { ctx }
    }

    pub async fn comment(
        &self,
        actor: &Claim,
        ticket_id: &str,
        command: AddComment,
    ) -> Result<CommentOutcome, ApplicationError> {
        command.validate()?;
        let now = self.ctx.clock.now();
        let mut ticket = self.ctx.load_ticket(actor, ticket_id).await?;
        let customer = self.ctx.load_customer(&ticket.customer_id).await?;
        let previous = ticket.status;
        let target = command.status.unwrap_or(previous);
        self.ctx
            .policy
            .check(PolicyAction::ChangeStatus { to: target }, actor, &ticket, &customer, now)
            .into_result()?;

        let transition = apply_transition(&mut ticket, actor, target, now)?;
        let mut committed = Vec::new();
        let mut time_log = None;
        if !matches!(transition, Transition::None) {
            ticket = self.ctx.save_ticket(&ticket).await?;
            committed.push(WriteStep::Ticket);
        }
        match transition {
            Transition::None => {}
            Transition::StartWork => {
                let record = self
                    .ctx
                    .audit
                    .open(&ticket, ActivityType::TicketInProgress, Some(&actor.user_id), now)
                    .await
                    .map_err(TicketContext::audit_failed)?;
                committed.push(WriteStep::AuditTrail);
                time_log = Some(record);
            }
            Transition::Resolve(settlement) => {
                if let Some(settlement) = settlement {
                    let settled = self.ctx.settle_run(&ticket, settlement).await?;
                    committed.push(WriteStep::AuditTrail);
                    time_log = settled.record;
                }
            }
        }

        let status_change = (previous != ticket.status).then_some(StatusChange {
            from: previous,
            to: ticket.status,
        });
        let comment = TicketComment::new(
            &ticket,
            actor,
            command.content,
            command.attach_ids,
            status_change,
            now,
        );
        self.ctx
            .store
            .create_comment(&comment)
            .await
            .map_err(|error| {
                if committed.is_empty() {
                    ApplicationError::from(error)
                } else {
                    ApplicationError::partial(WriteStep::Comment, &committed, error)
                }
            })?;

        if let Some(change) = status_change {
            self.ctx.notifier.status_changed(&ticket, change.from, &actor.name);
            if change.to == TicketStatus::Resolve {
                self.ctx.notifier.agent_completed(&actor.user_id);
                self.ctx.notifier.count_status(&ticket.company_id, TicketStatus::Resolve);
            }
            info!(
                ticket_id = %ticket.id,
                actor = %actor.user_id,
                from = %change.from,
                to = %change.to,
                "ticket status changed by comment"
            );
        }
        Ok(CommentOutcome {
            ticket,
            comment,
            time_log,
        })
    }
}

fn apply_transition(
    ticket: &mut Ticket,
    actor: &Claim,
    target: TicketStatus,
    now: EpochMillis,
) -> Result<Transition, ApplicationError> {
    match (ticket.status, target) {
        (from, to) if from == to => Ok(Transition::None),
        (TicketStatus::Open | TicketStatus::Resolve, TicketStatus::InProgress) => {
            ticket.assign(&actor.user_id);
            ticket.start_log(now)?;
            Ok(Transition::StartWork)
        }
        (TicketStatus::InProgress, TicketStatus::Resolve) => {
            let settlement = ticket.resolve(now, actor.as_agent(), new_id());
            Ok(Transition::Resolve(settlement))
        }
        (from, to) => Err(TicketError::StatusNotAllowed { from, to }.into()),
    }
}

#[cfg(test)]
mod ticket_comment_workflow_tests {
    use super::*;
    use crate::modules::tickets::core::log_time::LogTimeStatus;
    use crate::modules::tickets::core::policy::Denial;
    use crate::shared::infrastructure::document_store::in_memory::{
        Collection, InMemoryDocumentStore,
    };
    use crate::tests::fixtures::app::{T0, TestApp};
    use crate::tests::fixtures::claims::{agent, customer_claim};
    use crate::tests::fixtures::customers::CustomerBuilder;
    use crate::tests::fixtures::tickets::{TICKET_ID, TicketBuilder};
    use rstest::rstest;

    fn comment_with(status: Option<TicketStatus>) -> AddComment {
        AddComment {
            content: "Looking into it".into(),
            attach_ids: vec![],
            status,
        }
    }

    async fn app_with(ticket: Ticket) -> TestApp {
        let app = TestApp::new();
        app.seed_customer(CustomerBuilder::new().need_balance(true).build()).await;
        app.seed_ticket(ticket).await;
        app
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_start_work_when_an_agent_moves_an_open_ticket_in_progress() {
        let app = app_with(TicketBuilder::new().assigned(vec![]).build()).await;

        let outcome = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::InProgress)))
            .await
            .unwrap();

        assert_eq!(outcome.ticket.status, TicketStatus::InProgress);
        assert_eq!(outcome.ticket.log_time.status, LogTimeStatus::Running);
        assert!(outcome.ticket.is_assigned("agent-0001"));
        assert_eq!(outcome.time_log.unwrap().activity_type, ActivityType::TicketInProgress);
        assert_eq!(
            outcome.comment.status_change,
            Some(StatusChange {
                from: TicketStatus::Open,
                to: TicketStatus::InProgress
            })
        );
        app.tasks.drain().await;
        assert_eq!(app.store.notifications().await.len(), 1);
        assert_eq!(app.mailer.sent().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_settle_and_issue_a_token_on_resolve() {
        let app = app_with(TicketBuilder::new().running_since(T0).build()).await;
        app.audit_open(ActivityType::StartLog, T0).await;
        app.clock.set_secs(420);

        let outcome = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::Resolve)))
            .await
            .unwrap();

        let ticket = outcome.ticket;
        assert_eq!(ticket.status, TicketStatus::Resolve);
        assert!(ticket.token.is_some());
        assert!(ticket.reminder_sent);
        assert_eq!(ticket.completed_by.unwrap().id, "agent-0001");
        assert_eq!(ticket.log_time.total_duration_in_seconds, 420);
        assert_eq!(outcome.time_log.unwrap().duration_in_seconds, 420);
        let customer = app.customer().await;
        assert_eq!(customer.balance().time.used, 420);
        assert_eq!(customer.balance().remaining().total_seconds, 3180);

        app.tasks.drain().await;
        assert_eq!(app.store.agent_completed_tickets("agent-0001").await, 1);
        assert_eq!(
            app.store
                .company_ticket_counter(&ticket.company_id, TicketStatus::Resolve)
                .await,
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pin_the_audit_boundary_when_resolving_a_paused_log() {
        let app = app_with(TicketBuilder::new().running_since(T0).build()).await;
        app.audit_open(ActivityType::StartLog, T0).await;
        let mut ticket = app.ticket().await;
        ticket.pause_log(T0 + 300_000).unwrap();
        app.ctx().save_ticket(&ticket).await.unwrap();
        app.clock.set_secs(500);

        let outcome = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::Resolve)))
            .await
            .unwrap();

        assert_eq!(outcome.time_log.unwrap().end_at, Some(T0 + 300_000));
        assert_eq!(
            outcome.ticket.log_time.pause_history[0].resumed_at,
            Some(T0 + 500_000)
        );
        assert!(app.store.balance_history().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_resolving_an_open_ticket() {
        let app = app_with(TicketBuilder::new().build()).await;

        let result = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::Resolve)))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Denied(Denial::Transition(TicketError::StatusNotAllowed {
                from: TicketStatus::Open,
                to: TicketStatus::Resolve
            })))
        ));
        assert!(app.store.comments().await.is_empty());
        assert_eq!(app.ticket().await.version, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_let_a_customer_comment_without_changing_the_status() {
        let app = app_with(TicketBuilder::new().build()).await;

        let outcome = TicketCommentWorkflow::new(app.ctx())
            .comment(&customer_claim(), TICKET_ID, comment_with(None))
            .await
            .unwrap();

        assert_eq!(outcome.ticket.status, TicketStatus::Open);
        assert_eq!(outcome.comment.status_change, None);
        assert_eq!(app.ticket().await.version, 0);
        app.tasks.drain().await;
        assert!(app.store.notifications().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_to_start_work_without_balance() {
        let app = TestApp::new();
        app.seed_customer(
            CustomerBuilder::new()
                .need_balance(true)
                .subscription(true, None, 600, 600)
                .build(),
        )
        .await;
        app.seed_ticket(TicketBuilder::new().build()).await;

        let result = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::InProgress)))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Denied(Denial::InsufficientBalance { remaining: 0, required: 1 }))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_require_text_or_attachments() {
        let app = app_with(TicketBuilder::new().build()).await;
        let command = AddComment {
            content: "   ".into(),
            attach_ids: vec![],
            status: None,
        };
        let result = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, command)
            .await;
        assert!(matches!(result, Err(ApplicationError::Validation(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_the_comment_write_as_a_partial_failure() {
        let mut store = InMemoryDocumentStore::new();
        store.fail_writes_to(Collection::Comments);
        let app = TestApp::with_store(store);
        app.seed_customer(CustomerBuilder::new().build()).await;
        app.seed_ticket(TicketBuilder::new().build()).await;

        let result = TicketCommentWorkflow::new(app.ctx())
            .comment(&agent(), TICKET_ID, comment_with(Some(TicketStatus::InProgress)))
            .await;

        match result {
            Err(ApplicationError::PartialFailure { step, committed, .. }) => {
                assert_eq!(step, WriteStep::Comment);
                assert_eq!(committed, vec![WriteStep::Ticket, WriteStep::AuditTrail]);
            }
            other => panic!("expected a partial failure, got {other:?}"),
        }
    }
}
