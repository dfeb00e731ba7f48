use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::core::log_time::LogTimeStatus;
use crate::modules::tickets::core::time_log_record::TicketTimeLog;
use crate::modules::tickets::use_cases::report_time::handler::{
    BalanceView, DailySummary, DayQuery, TimeReport,
};
use crate::modules::tickets::use_cases::report_time::projection::ActiveSegment;
use crate::shell::state::AppState;

#[derive(SimpleObject, Clone)]
pub struct GqlSegment {
    pub started_at: i64,
    pub ended_at: i64,
    pub active_seconds: i64,
    pub trailing: bool,
}

impl From<ActiveSegment> for GqlSegment {
    fn from(v: ActiveSegment) -> Self {
        Self {
            started_at: v.started_at,
            ended_at: v.ended_at,
            active_seconds: v.active_seconds,
            trailing: v.trailing,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlTimeLog {
    pub id: String,
    pub activity_type: String,
    pub start_at: i64,
    pub end_at: Option<i64>,
    pub duration_in_seconds: i64,
    pub is_manual: bool,
    pub created_by: Option<String>,
}

impl From<TicketTimeLog> for GqlTimeLog {
    fn from(v: TicketTimeLog) -> Self {
        Self {
            activity_type: v.activity_type.as_str().to_string(),
            id: v.id,
            start_at: v.start_at,
            end_at: v.end_at,
            duration_in_seconds: v.duration_in_seconds,
            is_manual: v.is_manual,
            created_by: v.created_by,
        }
    }
}

fn log_status(status: LogTimeStatus) -> &'static str {
    match status {
        LogTimeStatus::NotStarted => "not_started",
        LogTimeStatus::Running => "running",
        LogTimeStatus::Paused => "paused",
        LogTimeStatus::Done => "done",
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlTimeReport {
    pub ticket_id: String,
    pub code: String,
    pub status: String,
    pub log_status: String,
    pub duration_in_seconds: i64,
    pub total_duration_in_seconds: i64,
    pub total_paused_duration_in_seconds: i64,
    pub segments: Vec<GqlSegment>,
    pub history: Vec<GqlTimeLog>,
}

impl From<TimeReport> for GqlTimeReport {
    fn from(v: TimeReport) -> Self {
        Self {
            status: v.status.to_string(),
            log_status: log_status(v.log_time.status).to_string(),
            duration_in_seconds: v.log_time.duration_in_seconds,
            total_duration_in_seconds: v.log_time.total_duration_in_seconds,
            total_paused_duration_in_seconds: v.log_time.total_paused_duration_in_seconds,
            segments: v.segments.into_iter().map(Into::into).collect(),
            history: v.history.into_iter().map(Into::into).collect(),
            ticket_id: v.ticket_id,
            code: v.code,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlBalance {
    pub customer_id: String,
    pub total: i64,
    pub used: i64,
    pub remaining_seconds: i64,
    pub remaining_hour: i64,
    pub remaining_minute: i64,
    pub remaining_second: i64,
}

impl From<BalanceView> for GqlBalance {
    fn from(v: BalanceView) -> Self {
        Self {
            customer_id: v.customer_id,
            total: v.total,
            used: v.used,
            remaining_seconds: v.remaining.total_seconds,
            remaining_hour: v.remaining.hour,
            remaining_minute: v.remaining.minute,
            remaining_second: v.remaining.second,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlDailySummary {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub ticket_count: u64,
    pub active_seconds: i64,
    pub paused_seconds: i64,
}

impl From<DailySummary> for GqlDailySummary {
    fn from(v: DailySummary) -> Self {
        Self {
            year: v.year,
            month: v.month,
            day: v.day,
            ticket_count: v.ticket_count as u64,
            active_seconds: v.active_seconds,
            paused_seconds: v.paused_seconds,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn time_report(
        &self,
        context: &Context<'_>,
        ticket_id: String,
    ) -> GqlResult<GqlTimeReport> {
        let state = context.data_unchecked::<AppState>();
        let claim = context.data::<Claim>()?;
        let report = state.reports.time_report(claim, &ticket_id).await?;
        Ok(report.into())
    }

    async fn daily_summary(
        &self,
        context: &Context<'_>,
        year: i32,
        month: u32,
        day: u32,
    ) -> GqlResult<GqlDailySummary> {
        let state = context.data_unchecked::<AppState>();
        let claim = context.data::<Claim>()?;
        let summary = state
            .reports
            .daily_summary(claim, DayQuery { year, month, day })
            .await?;
        Ok(summary.into())
    }

    async fn customer_balance(
        &self,
        context: &Context<'_>,
        customer_id: String,
    ) -> GqlResult<GqlBalance> {
        let state = context.data_unchecked::<AppState>();
        let claim = context.data::<Claim>()?;
        let view = state.reports.balance(claim, &customer_id).await?;
        Ok(view.into())
    }
}
