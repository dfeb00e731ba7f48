// Application-level errors shared by every ticket use case, and their HTTP mapping.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::modules::tickets::adapters::outbound::balance_settlement::SettlementError;
use crate::modules::tickets::core::errors::TicketError;
use crate::modules::tickets::core::policy::Denial;
use crate::shared::infrastructure::document_store::StoreError;

/// Independent, non-transactional writes in the order an operation performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStep {
    Ticket,
    AuditTrail,
    CustomerBalance,
    BalanceLedger,
    Comment,
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteStep::Ticket => "ticket",
            WriteStep::AuditTrail => "audit_trail",
            WriteStep::CustomerBalance => "customer_balance",
            WriteStep::BalanceLedger => "balance_ledger",
            WriteStep::Comment => "comment",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    StateConflict(#[from] TicketError),

    #[error(transparent)]
    Denied(#[from] Denial),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("ticket was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { expected: i64, actual: i64 },

    #[error("missing or invalid identity: {0}")]
    Unauthenticated(String),

    #[error("request exceeded its deadline of {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{step} write failed after {committed:?} committed: {reason}")]
    PartialFailure {
        step: WriteStep,
        committed: Vec<WriteStep>,
        reason: String,
    },

    #[error("unexpected: {0}")]
    Internal(String),
}

impl ApplicationError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        ApplicationError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn partial(step: WriteStep, committed: &[WriteStep], reason: impl fmt::Display) -> Self {
        ApplicationError::PartialFailure {
            step,
            committed: committed.to_vec(),
            reason: reason.to_string(),
        }
    }

    /// Maps a settlement failure that happened after `committed` steps.
    pub fn from_settlement(error: SettlementError, committed: &[WriteStep]) -> Self {
        let mut committed = committed.to_vec();
        let step = match &error {
            SettlementError::LedgerWrite(_) => {
                committed.push(WriteStep::CustomerBalance);
                WriteStep::BalanceLedger
            }
            _ => WriteStep::CustomerBalance,
        };
        if committed.is_empty() && step == WriteStep::CustomerBalance {
            return ApplicationError::Internal(error.to_string());
        }
        ApplicationError::PartialFailure {
            step,
            committed,
            reason: error.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationError::StateConflict(_) => StatusCode::CONFLICT,
            ApplicationError::Denied(denial) if denial.is_state_conflict() => StatusCode::CONFLICT,
            ApplicationError::Denied(_) => StatusCode::FORBIDDEN,
            ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApplicationError::Conflict { .. } => StatusCode::CONFLICT,
            ApplicationError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApplicationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApplicationError::PartialFailure { .. } | ApplicationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApplicationError::Validation(_) => "validation",
            ApplicationError::StateConflict(_) => "state_conflict",
            ApplicationError::Denied(denial) if denial.is_state_conflict() => "state_conflict",
            ApplicationError::Denied(_) => "denied",
            ApplicationError::NotFound { .. } => "not_found",
            ApplicationError::Conflict { .. } => "conflict",
            ApplicationError::Unauthenticated(_) => "unauthenticated",
            ApplicationError::Timeout(_) => "timeout",
            ApplicationError::PartialFailure { .. } => "partial_failure",
            ApplicationError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::VersionMismatch { expected, actual } => {
                ApplicationError::Conflict { expected, actual }
            }
            StoreError::Missing { collection, id } => ApplicationError::NotFound {
                resource: collection,
                id,
            },
            StoreError::Backend(reason) => ApplicationError::Internal(reason),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    committed: Option<&'a [WriteStep]>,
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let fields = match &self {
            ApplicationError::Validation(fields) => Some(fields.as_slice()),
            _ => None,
        };
        let committed = match &self {
            ApplicationError::PartialFailure { committed, .. } => Some(committed.as_slice()),
            _ => None,
        };
        let error = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            fields,
            committed,
        };
        let body = serde_json::json!({ "error": error });
        (status, Json(body)).into_response()
    }
}

/// Runs a use case under the request deadline. The future is dropped on expiry.
pub async fn with_deadline<T, F>(limit: Duration, operation: F) -> Result<T, ApplicationError>
where
    F: Future<Output = Result<T, ApplicationError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(ApplicationError::Timeout(limit)),
    }
}
