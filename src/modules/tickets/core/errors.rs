use crate::modules::tickets::core::ticket::TicketStatus;

/// State conflicts raised by the ticket and log-time state machines.
/// Messages are part of the public contract and reach the caller verbatim.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TicketError {
    #[error("log already running")]
    LogAlreadyRunning,

    #[error("log not running")]
    LogNotRunning,

    #[error("log already paused")]
    LogAlreadyPaused,

    #[error("log is not paused")]
    LogNotPaused,

    #[error("no pause history found")]
    NoPauseHistory,

    #[error("log already resumed")]
    LogAlreadyResumed,

    #[error("pause duration is invalid")]
    InvalidPauseDuration,

    #[error("stop the running log before editing the time track")]
    LogInUse,

    #[error("status {to} is not allowed while the ticket is {from}")]
    StatusNotAllowed { from: TicketStatus, to: TicketStatus },

    #[error("ticket cannot be closed while it is {0}")]
    NotClosable(TicketStatus),

    #[error("ticket can only be cancelled while it is open")]
    NotCancellable,

    #[error("ticket is not closed")]
    NotClosed,
}
