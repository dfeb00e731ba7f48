use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};

use crate::modules::tickets::core::claim::Claim;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError, with_deadline};
use crate::modules::tickets::use_cases::report_time::handler::{
    BalanceView, DailySummary, DayQuery, TimeReport,
};
use crate::shell::state::AppState;

pub async fn time_report(
    State(state): State<AppState>,
    claim: Claim,
    Path(ticket_id): Path<String>,
) -> Result<Json<TimeReport>, ApplicationError> {
    let report = with_deadline(
        state.request_timeout,
        state.reports.time_report(&claim, &ticket_id),
    )
    .await?;
    Ok(Json(report))
}

pub async fn daily_summary(
    State(state): State<AppState>,
    claim: Claim,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Json<DailySummary>, ApplicationError> {
    let Query(query) = query.map_err(|rejection| {
        ApplicationError::Validation(vec![FieldError::new("query", rejection.body_text())])
    })?;
    let summary =
        with_deadline(state.request_timeout, state.reports.daily_summary(&claim, query)).await?;
    Ok(Json(summary))
}

pub async fn balance(
    State(state): State<AppState>,
    claim: Claim,
    Path(customer_id): Path<String>,
) -> Result<Json<BalanceView>, ApplicationError> {
    let view =
        with_deadline(state.request_timeout, state.reports.balance(&claim, &customer_id)).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod report_time_http_inbound_tests {
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::shell::state::AppState;
    use crate::tests::fixtures::app::{TestApp, agent_request, customer_request};
    use crate::tests::fixtures::customers::CustomerBuilder;
    use crate::tests::fixtures::tickets::TicketBuilder;

    use super::{balance, daily_summary, time_report};

    async fn make_test_state() -> AppState {
        let app = TestApp::new();
        app.seed_customer(CustomerBuilder::new().subscription(true, None, 7200, 3723).build())
            .await;
        app.seed_ticket(TicketBuilder::new().build()).await;
        app.state()
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/tickets/{id}/time-report", get(time_report))
            .route("/reports/daily", get(daily_summary))
            .route("/customers/{id}/balance", get(balance))
            .with_state(state)
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn it_should_return_the_time_report_of_a_ticket() {
        let response = app(make_test_state().await)
            .oneshot(agent_request("GET", "/tickets/ticket-0001/time-report", Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["ticket_id"], "ticket-0001");
        assert_eq!(json["segments"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn it_should_return_422_when_the_day_is_missing() {
        let response = app(make_test_state().await)
            .oneshot(agent_request("GET", "/reports/daily?year=2024&month=2", Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn it_should_return_the_balance_split_into_hours_minutes_and_seconds() {
        let response = app(make_test_state().await)
            .oneshot(customer_request("GET", "/customers/customer-0001/balance", Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["used"], 3723);
        assert_eq!(
            json["remaining"],
            serde_json::json!({"total_seconds": 3477, "hour": 0, "minute": 57, "second": 57})
        );
    }
}
