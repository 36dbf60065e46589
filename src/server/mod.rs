pub mod router;
pub mod shutdown;
pub mod state;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::events::EventAdapter;
use crate::store::UserStore;

/// Start the HTTP server with the given configuration.
///
/// The listener is bound before the bus connection is attempted, so the
/// service is reachable immediately whatever the state of NATS.
pub async fn start(config: ServiceConfig) -> Result<(), ServiceError> {
    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServiceError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    let events = Arc::new(EventAdapter::new(config.adapter_options()));
    let app_state = state::AppState::new(
        Arc::new(UserStore::new()),
        Arc::clone(&events),
        config.build_info(),
    );

    let connect = if config.nats_enabled {
        let nats = config.nats_config();
        Some(tokio::spawn(async move { events.connect(nats).await }))
    } else {
        tracing::info!("NATS disabled, running without event notifications");
        None
    };

    serve(listener, app_state, connect, shutdown::shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then tear down the event adapter.
///
/// In-flight requests complete before the adapter is closed. An
/// unfinished connect attempt is abandoned.
pub async fn serve<F>(
    listener: TcpListener,
    app_state: state::AppState,
    connect: Option<JoinHandle<()>>,
    shutdown: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let events = Arc::clone(&app_state.events);
    let app = router::build(app_state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServiceError::Server(format!("Server error: {e}")))?;

    tracing::info!("HTTP server stopped, closing event adapter");

    if let Some(task) = connect {
        if !task.is_finished() {
            tracing::info!("Abandoning pending NATS connection attempt");
            task.abort();
        }
    }
    events.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
