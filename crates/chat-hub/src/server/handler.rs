//! HTTP handlers
//!
//! The WebSocket endpoint hands upgraded sockets to the session bootstrap;
//! the rest are operational endpoints.

use crate::connection::accept;
use crate::hub::HubStats;
use crate::server::HubState;
use crate::transport::WebSocketTransport;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chat_common::{AppError, ErrorResponse};

/// WebSocket endpoint
pub async fn ws_handler(State(state): State<HubState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let limits = state.limits();

    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_message_size)
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            accept(state.hub(), WebSocketTransport::new(socket), limits);
        })
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Membership and delivery counters
pub async fn stats_handler(
    State(state): State<HubState>,
) -> Result<Json<HubStats>, (StatusCode, Json<ErrorResponse>)> {
    match state.hub().snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot.stats())),
        Err(e) => {
            tracing::error!(error = %e, "Stats requested while hub is down");
            let err = AppError::HubUnavailable;
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            Err((status, Json(ErrorResponse::from(err))))
        }
    }
}
