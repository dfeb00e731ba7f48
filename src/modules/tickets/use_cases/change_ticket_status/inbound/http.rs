use axum::Json;
use axum::extract::{Path, State};

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::context::TicketOutcome;
use crate::modules::tickets::use_cases::errors::{ApplicationError, with_deadline};
use crate::shell::state::AppState;

type Outcome = Result<Json<TicketOutcome>, ApplicationError>;

pub async fn close(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.status_handler.close(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn cancel(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.status_handler.cancel(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn reopen(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.status_handler.reopen(&claim, &ticket_id))
        .await
        .map(Json)
}

/// Reached from the resolution email; the token is the only credential.
pub async fn close_by_token(State(state): State<AppState>, Path(token): Path<String>) -> Outcome {
    with_deadline(state.request_timeout, state.status_handler.close_by_token(&token))
        .await
        .map(Json)
}
