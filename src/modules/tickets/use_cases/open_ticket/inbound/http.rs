use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::context::TicketOutcome;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError, with_deadline};
use crate::modules::tickets::use_cases::open_ticket::command::OpenTicket;
use crate::shell::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    claim: Claim,
    body: Result<Json<OpenTicket>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketOutcome>), ApplicationError> {
    let Json(command) = body.map_err(|rejection| {
        ApplicationError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;
    let outcome = with_deadline(
        state.request_timeout,
        state.open_ticket_handler.handle(&claim, command),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
