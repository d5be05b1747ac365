//! Hub server setup
//!
//! Provides the HTTP router, the WebSocket endpoint and the serve loop.

mod handler;
mod state;

pub use handler::{health_check, stats_handler, ws_handler};
pub use state::HubState;

use crate::connection::ClientLimits;
use crate::hub::Hub;
use axum::{routing::get, Router};
use chat_common::{AppConfig, AppError, AppResult};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the hub router
pub fn create_router() -> Router<HubState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .route("/stats", get(stats_handler))
}

/// Build the complete application
pub fn create_app(state: HubState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on an already bound listener until `shutdown` resolves
pub async fn run_server<F>(listener: TcpListener, app: Router, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Hub listening on ws://{}/ws", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run the complete hub server with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let addr = config.server.address();
    tracing::info!("Starting hub server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;

    let (hub, hub_task) = Hub::spawn(&config.hub);
    let app = create_app(HubState::new(hub, ClientLimits::from(&config.hub)));

    run_server(listener, app, shutdown_signal()).await?;

    // Upgraded connections keep their own hub handles; stop the task outright.
    hub_task.abort();
    tracing::info!("Hub server shut down");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
