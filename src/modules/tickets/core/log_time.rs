// LogTime is the time-tracking state machine embedded in every ticket.
//
// Transitions
// - NotStarted | Done | Paused --start--> Running
// - Running --pause--> Paused --resume--> Running
// - Running --stop--> Done
// - Running | Paused --settle--> Done (resolve and close paths)
//
// Boundaries
// - Pure. Callers persist the ticket and write audit records afterwards.

use serde::{Deserialize, Serialize};

use crate::modules::tickets::core::errors::TicketError;
use crate::shared::core::primitives::{EpochMillis, seconds_between};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTimeStatus {
    #[default]
    NotStarted,
    Running,
    Paused,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseEntry {
    pub paused_at: EpochMillis,
    pub resumed_at: Option<EpochMillis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTime {
    pub start_at: Option<EpochMillis>,
    pub end_at: Option<EpochMillis>,
    pub duration_in_seconds: i64,
    pub pause_duration_in_seconds: i64,
    pub total_duration_in_seconds: i64,
    pub total_paused_duration_in_seconds: i64,
    pub status: LogTimeStatus,
    pub pause_history: Vec<PauseEntry>,
}

/// An active interval that was just closed and must be settled against the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub interval_seconds: i64,
    /// End boundary written to the audit trail. Differs from "now" when the
    /// log was paused at settlement time.
    pub logs_end_at: EpochMillis,
}

/// Outcome of a stop: the whole run, and the stretch since the last start or resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoppedRun {
    pub run_seconds: i64,
    pub interval_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualDuration {
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl ManualDuration {
    pub fn total_seconds(&self) -> i64 {
        self.hour
            .saturating_mul(3600)
            .saturating_add(self.minute.saturating_mul(60))
            .saturating_add(self.second)
    }
}

impl LogTime {
    pub fn start(&mut self, now: EpochMillis) -> Result<(), TicketError> {
        if self.status == LogTimeStatus::Running {
            return Err(TicketError::LogAlreadyRunning);
        }
        self.duration_in_seconds = 0;
        self.pause_duration_in_seconds = 0;
        self.pause_history.clear();
        self.start_at = Some(now);
        self.end_at = None;
        self.status = LogTimeStatus::Running;
        Ok(())
    }

    pub fn pause(&mut self, now: EpochMillis) -> Result<Settlement, TicketError> {
        match self.status {
            LogTimeStatus::Running => {}
            LogTimeStatus::Paused => return Err(TicketError::LogAlreadyPaused),
            _ => return Err(TicketError::LogNotRunning),
        }
        let interval = self.active_interval(now);
        self.duration_in_seconds += interval;
        self.pause_history.push(PauseEntry {
            paused_at: now,
            resumed_at: None,
        });
        self.status = LogTimeStatus::Paused;
        Ok(Settlement {
            interval_seconds: interval,
            logs_end_at: now,
        })
    }

    /// Returns the length of the pause that just ended, in seconds.
    pub fn resume(&mut self, now: EpochMillis) -> Result<i64, TicketError> {
        if self.status != LogTimeStatus::Paused {
            return Err(TicketError::LogNotPaused);
        }
        let Some(last) = self.pause_history.last_mut() else {
            return Err(TicketError::NoPauseHistory);
        };
        if last.resumed_at.is_some() {
            return Err(TicketError::LogAlreadyResumed);
        }
        let paused = seconds_between(last.paused_at, now);
        if paused < 1 {
            return Err(TicketError::InvalidPauseDuration);
        }
        last.resumed_at = Some(now);
        self.pause_duration_in_seconds += paused;
        self.status = LogTimeStatus::Running;
        Ok(paused)
    }

    pub fn stop(&mut self, now: EpochMillis) -> Result<StoppedRun, TicketError> {
        if self.status != LogTimeStatus::Running {
            return Err(TicketError::LogNotRunning);
        }
        let interval = self.active_interval(now);
        let elapsed = self
            .start_at
            .map(|start_at| seconds_between(start_at, now))
            .unwrap_or(0);
        let duration = (elapsed - self.pause_duration_in_seconds).max(0);
        self.duration_in_seconds = duration;
        self.total_duration_in_seconds += duration;
        self.total_paused_duration_in_seconds += self.pause_duration_in_seconds;
        self.status = LogTimeStatus::Done;
        self.end_at = Some(now);
        Ok(StoppedRun {
            run_seconds: duration,
            interval_seconds: interval,
        })
    }

    /// Finishes the current run on resolve or close. Returns `None` when there
    /// is no run to finish.
    ///
    /// When the log is paused, the interval up to the pause was already settled
    /// by the pause itself, so the settled interval is zero and the audit
    /// boundary stays at `paused_at` while the pause entry is marked resumed now.
    pub fn settle(&mut self, now: EpochMillis) -> Option<Settlement> {
        let settlement = match self.status {
            LogTimeStatus::Running => Settlement {
                interval_seconds: self.active_interval(now),
                logs_end_at: now,
            },
            LogTimeStatus::Paused => {
                let last = self.pause_history.last_mut()?;
                if last.resumed_at.is_some() {
                    return None;
                }
                let logs_end_at = last.paused_at;
                self.pause_duration_in_seconds += seconds_between(last.paused_at, now).max(0);
                last.resumed_at = Some(now);
                Settlement {
                    interval_seconds: 0,
                    logs_end_at,
                }
            }
            LogTimeStatus::NotStarted | LogTimeStatus::Done => return None,
        };
        self.duration_in_seconds += settlement.interval_seconds;
        self.total_duration_in_seconds += self.duration_in_seconds;
        self.total_paused_duration_in_seconds += self.pause_duration_in_seconds;
        self.status = LogTimeStatus::Done;
        self.end_at = Some(now);
        Some(settlement)
    }

    pub fn edit_manual(&mut self, duration: ManualDuration) -> Result<i64, TicketError> {
        if matches!(self.status, LogTimeStatus::Running | LogTimeStatus::Paused) {
            return Err(TicketError::LogInUse);
        }
        self.start_at = None;
        self.end_at = None;
        self.duration_in_seconds = 0;
        self.total_duration_in_seconds = duration.total_seconds();
        Ok(self.total_duration_in_seconds)
    }

    pub fn is_paused(&self) -> bool {
        self.status == LogTimeStatus::Paused
    }

    fn active_interval(&self, now: EpochMillis) -> i64 {
        let since = match self.pause_history.last() {
            Some(pause) => pause.resumed_at,
            None => self.start_at,
        };
        since
            .map(|since| seconds_between(since, now).max(0))
            .unwrap_or(0)
    }
}
