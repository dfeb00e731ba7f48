// Read-time reconstruction of a ticket's active stretches.
//
// Nothing here is stored. Segments are derived from the pause history on every read.

use serde::Serialize;

use crate::modules::tickets::core::log_time::{LogTime, LogTimeStatus};
use crate::shared::core::primitives::{EpochMillis, seconds_between};

/// One stretch of active work that ended in a pause, or in the end of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSegment {
    pub started_at: EpochMillis,
    pub ended_at: EpochMillis,
    pub active_seconds: i64,
    /// True for the closing stretch from the last resume to the end of the run.
    pub trailing: bool,
}

impl ActiveSegment {
    fn between(started_at: EpochMillis, ended_at: EpochMillis, trailing: bool) -> Self {
        Self {
            started_at,
            ended_at,
            active_seconds: seconds_between(started_at, ended_at).max(0),
            trailing,
        }
    }
}

/// Walks the pause history pairwise. Each pause closes the stretch that began at
/// the previous resume, or at the start of the run for the first pause.
pub fn active_segments(log: &LogTime) -> Vec<ActiveSegment> {
    let mut segments = Vec::with_capacity(log.pause_history.len() + 1);
    let mut since = log.start_at;
    for pause in &log.pause_history {
        if let Some(started_at) = since {
            segments.push(ActiveSegment::between(started_at, pause.paused_at, false));
        }
        since = pause.resumed_at;
    }

    let last_resumed = log.pause_history.last().and_then(|pause| pause.resumed_at);
    if let (LogTimeStatus::Done, Some(resumed_at), Some(end_at)) =
        (log.status, last_resumed, log.end_at)
    {
        segments.push(ActiveSegment::between(resumed_at, end_at, true));
    }
    segments
}

/// Settled runs plus the run in flight, if any.
pub fn lifetime_active_seconds(log: &LogTime) -> i64 {
    match log.status {
        LogTimeStatus::Running | LogTimeStatus::Paused => {
            log.total_duration_in_seconds + log.duration_in_seconds
        }
        LogTimeStatus::NotStarted | LogTimeStatus::Done => log.total_duration_in_seconds,
    }
}
