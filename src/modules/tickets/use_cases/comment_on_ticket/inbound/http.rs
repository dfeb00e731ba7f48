use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::comment_on_ticket::command::AddComment;
use crate::modules::tickets::use_cases::comment_on_ticket::handler::CommentOutcome;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError, with_deadline};
use crate::shell::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
    body: Result<Json<AddComment>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentOutcome>), ApplicationError> {
    let Json(command) = body.map_err(|rejection| {
        ApplicationError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;
    let outcome = with_deadline(
        state.request_timeout,
        state.comment_workflow.comment(&claim, &ticket_id, command),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
