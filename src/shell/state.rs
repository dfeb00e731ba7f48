use std::sync::Arc;
use std::time::Duration;

use crate::modules::tickets::use_cases::change_ticket_status::handler::ChangeTicketStatusHandler;
use crate::modules::tickets::use_cases::comment_on_ticket::handler::TicketCommentWorkflow;
use crate::modules::tickets::use_cases::context::TicketContext;
use crate::modules::tickets::use_cases::open_ticket::handler::OpenTicketHandler;
use crate::modules::tickets::use_cases::reconcile_balances::handler::BalanceReconciler;
use crate::modules::tickets::use_cases::report_time::handler::TimeReports;
use crate::modules::tickets::use_cases::track_time::handler::TimeLogEngine;

#[derive(Clone)]
pub struct AppState {
    pub time_log_engine: Arc<TimeLogEngine>,
    pub comment_workflow: Arc<TicketCommentWorkflow>,
    pub status_handler: Arc<ChangeTicketStatusHandler>,
    pub open_ticket_handler: Arc<OpenTicketHandler>,
    pub reports: Arc<TimeReports>,
    pub reconciler: Arc<BalanceReconciler>,
    /// Deadline applied around every use case future.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(ctx: TicketContext, request_timeout: Duration) -> Self {
        Self {
            time_log_engine: Arc::new(TimeLogEngine::new(ctx.clone())),
            comment_workflow: Arc::new(TicketCommentWorkflow::new(ctx.clone())),
            status_handler: Arc::new(ChangeTicketStatusHandler::new(ctx.clone())),
            open_ticket_handler: Arc::new(OpenTicketHandler::new(ctx.clone())),
            reports: Arc::new(TimeReports::new(ctx.clone())),
            reconciler: Arc::new(BalanceReconciler::new(ctx)),
            request_timeout,
        }
    }
}
