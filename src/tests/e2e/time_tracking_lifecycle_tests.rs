use axum::Router;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::modules::tickets::core::time_log_record::ActivityType;
use crate::shell::http::router;
use crate::tests::fixtures::app::{TestApp, admin_request, agent_request, customer_request};
use crate::tests::fixtures::customers::CustomerBuilder;
use crate::tests::fixtures::tickets::TicketBuilder;

async fn constrained_app() -> (TestApp, Router) {
    let app = TestApp::new();
    app.seed_customer(CustomerBuilder::new().need_balance(true).build()).await;
    app.seed_ticket(TicketBuilder::new().build()).await;
    let router = router(app.state());
    (app, router)
}

async fn send(router: &Router, request: axum::http::Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

fn log_action(action: &str) -> axum::http::Request<Body> {
    let uri = format!("/tickets/ticket-0001/time-log/{action}");
    agent_request("POST", &uri, Body::empty())
}

fn comment(body: &'static str) -> axum::http::Request<Body> {
    agent_request("POST", "/tickets/ticket-0001/comments", Body::from(body))
}

async fn json_of(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn tracks_settles_and_reconciles_a_full_run() {
    let (app, router) = constrained_app().await;

    for (seconds, action) in [(60, "start"), (360, "pause"), (480, "resume"), (600, "stop")] {
        app.clock.set_secs(seconds);
        let response = send(&router, log_action(action)).await;
        assert_eq!(response.status(), StatusCode::OK, "{action} failed");
    }

    let request = agent_request("GET", "/tickets/ticket-0001/time-report", Body::empty());
    let report = json_of(send(&router, request).await).await;
    assert_eq!(report["log_time"]["duration_in_seconds"], 420);
    assert_eq!(report["log_time"]["status"], "done");
    let activities: Vec<&str> = report["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["activity_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        activities,
        vec![
            ActivityType::StartLog.as_str(),
            ActivityType::ResumeLog.as_str(),
            ActivityType::StopLog.as_str()
        ]
    );

    // Only the paused interval was settled live. The stretch closed by the stop is repaired here.
    assert_eq!(app.customer().await.balance().time.used, 300);
    let reconcile = || admin_request("POST", "/customers/customer-0001/reconcile", Body::empty());
    let first = json_of(send(&router, reconcile()).await).await;
    assert_eq!(first["debited_seconds"], 120);
    let second = json_of(send(&router, reconcile()).await).await;
    assert_eq!(second["debited_seconds"], 0);

    let request = customer_request("GET", "/customers/customer-0001/balance", Body::empty());
    let balance = json_of(send(&router, request).await).await;
    assert_eq!(balance["used"], 420);
    assert_eq!(balance["remaining"]["total_seconds"], 3180);
}

#[tokio::test]
async fn resolves_through_a_comment_and_closes_with_the_emailed_token() {
    let (app, router) = constrained_app().await;
    app.clock.set_secs(60);
    send(&router, log_action("start")).await;
    app.clock.set_secs(300);

    let body = r#"{"content":"Fixed the tunnel config","status":"resolve"}"#;
    let response = send(&router, comment(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome = json_of(response).await;
    assert_eq!(outcome["ticket"]["status"], "resolve");
    let token = outcome["ticket"]["token"].as_str().unwrap().to_string();
    assert_eq!(app.customer().await.balance().time.used, 240);

    let uri = format!("/tickets/confirm/{token}");
    let confirm = || axum::http::Request::post(&uri).body(Body::empty()).unwrap();
    let closed = send(&router, confirm()).await;
    assert_eq!(closed.status(), StatusCode::OK);
    assert_eq!(json_of(closed).await["ticket"]["status"], "closed");

    let replayed = send(&router, confirm()).await;
    assert_eq!(replayed.status(), StatusCode::NOT_FOUND);

    app.tasks.drain().await;
    assert_eq!(app.store.agent_completed_tickets("agent-0001").await, 1);
    assert!(app.mailer.sent().await.iter().any(|email| email.body.contains(&token)));
}

#[tokio::test]
async fn refuses_to_resolve_a_ticket_that_was_never_worked_on() {
    let (app, router) = constrained_app().await;

    let body = r#"{"content":"Done?","status":"resolve"}"#;
    let response = send(&router, comment(body)).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_of(response).await["error"]["code"], "state_conflict");
    assert!(app.store.comments().await.is_empty());
    assert_eq!(app.ticket().await.version, 0);
}

#[tokio::test]
async fn rejects_unauthenticated_requests_and_reports_missing_tickets() {
    let (_app, router) = constrained_app().await;

    let anonymous = axum::http::Request::post("/tickets/ticket-0001/time-log/start")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, anonymous).await.status(), StatusCode::UNAUTHORIZED);

    let request = agent_request("POST", "/tickets/ghost/time-log/start", Body::empty());
    let missing = send(&router, request).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serves_the_time_report_over_graphql() {
    let (app, router) = constrained_app().await;
    app.clock.set_secs(60);
    send(&router, log_action("start")).await;
    app.clock.set_secs(180);
    send(&router, log_action("pause")).await;

    let query = concat!(
        r#"{"query":"{ timeReport(ticketId: \"ticket-0001\") "#,
        r#"{ status segments { activeSeconds } } "#,
        r#"customerBalance(customerId: \"customer-0001\") { used } }"}"#,
    );
    let response = send(&router, agent_request("POST", "/gql", Body::from(query))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_of(response).await;
    assert_eq!(json["data"]["timeReport"]["status"], "in_progress");
    assert_eq!(json["data"]["timeReport"]["segments"][0]["activeSeconds"], 120);
    assert_eq!(json["data"]["customerBalance"]["used"], 120);
}
