use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::context::TicketOutcome;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError, with_deadline};
use crate::modules::tickets::use_cases::track_time::command::EditTimeTrack;
use crate::shell::state::AppState;

type Outcome = Result<Json<TicketOutcome>, ApplicationError>;

pub async fn start(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.time_log_engine.start(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn pause(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.time_log_engine.pause(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn resume(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.time_log_engine.resume(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn stop(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Outcome {
    with_deadline(state.request_timeout, state.time_log_engine.stop(&claim, &ticket_id))
        .await
        .map(Json)
}

pub async fn edit_manual(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
    body: Result<Json<EditTimeTrack>, JsonRejection>,
) -> Outcome {
    let Json(command) = body.map_err(|rejection| {
        ApplicationError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;
    with_deadline(
        state.request_timeout,
        state.time_log_engine.edit_manual(&claim, &ticket_id, command),
    )
    .await
    .map(Json)
}
