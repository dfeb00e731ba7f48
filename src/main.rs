use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use helpdesk_timelog::modules::tickets::core::policy::PolicyGate;
use helpdesk_timelog::modules::tickets::use_cases::context::TicketContext;
use helpdesk_timelog::shared::core::primitives::SystemClock;
use helpdesk_timelog::shared::infrastructure::background::BackgroundTasks;
use helpdesk_timelog::shared::infrastructure::document_store::in_memory::InMemoryDocumentStore;
use helpdesk_timelog::shared::infrastructure::mailer::tracing_mailer::TracingMailer;
use helpdesk_timelog::shell::config::Config;
use helpdesk_timelog::shell::http::router;
use helpdesk_timelog::shell::state::AppState;

const DRAIN_LIMIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    fmt().with_env_filter(filter).init();

    // In-memory deps for now
    let store = Arc::new(InMemoryDocumentStore::new());
    let tasks = Arc::new(BackgroundTasks::new());
    let ctx = TicketContext::new(
        store,
        Arc::new(TracingMailer),
        tasks.clone(),
        Arc::new(SystemClock),
        PolicyGate::new(config.min_reopen_credit_seconds),
    );
    let app = router(AppState::new(ctx, config.request_timeout));

    info!(addr = %config.http_addr, "helpdesk time-log API listening, GraphQL on /gql");
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("draining background tasks");
    tasks.drain_within(DRAIN_LIMIT).await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}
