use axum::Json;
use axum::extract::{Path, State};

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::errors::{ApplicationError, with_deadline};
use crate::modules::tickets::use_cases::reconcile_balances::handler::ReconcileReport;
use crate::shell::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    claim: Claim,
    Path(customer_id): Path<String>,
) -> Result<Json<ReconcileReport>, ApplicationError> {
    let report = with_deadline(
        state.request_timeout,
        state.reconciler.reconcile(&claim, &customer_id),
    )
    .await?;
    Ok(Json(report))
}
