use axum::{
    Extension, Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::modules::tickets::use_cases::change_ticket_status::inbound::http as status_http;
use crate::modules::tickets::use_cases::comment_on_ticket::inbound::http as comment_http;
use crate::modules::tickets::use_cases::open_ticket::inbound::http as open_http;
use crate::modules::tickets::use_cases::reconcile_balances::inbound::http as reconcile_http;
use crate::modules::tickets::use_cases::report_time::inbound::http as report_http;
use crate::modules::tickets::use_cases::track_time::inbound::http as track_http;
use crate::shell::graphql;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    let schema = graphql::schema(state.clone());
    Router::new()
        .route("/tickets", post(open_http::handle))
        .route("/tickets/{id}/time-log/start", post(track_http::start))
        .route("/tickets/{id}/time-log/pause", post(track_http::pause))
        .route("/tickets/{id}/time-log/resume", post(track_http::resume))
        .route("/tickets/{id}/time-log/stop", post(track_http::stop))
        .route("/tickets/{id}/time-log", put(track_http::edit_manual))
        .route("/tickets/{id}/comments", post(comment_http::handle))
        .route("/tickets/{id}/close", post(status_http::close))
        .route("/tickets/{id}/cancel", post(status_http::cancel))
        .route("/tickets/{id}/reopen", post(status_http::reopen))
        .route("/tickets/confirm/{token}", post(status_http::close_by_token))
        .route("/tickets/{id}/time-report", get(report_http::time_report))
        .route("/reports/daily", get(report_http::daily_summary))
        .route("/customers/{id}/balance", get(report_http::balance))
        .route("/customers/{id}/reconcile", post(reconcile_http::handle))
        .route("/gql", get(graphql::graphiql).post(graphql::graphql))
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
