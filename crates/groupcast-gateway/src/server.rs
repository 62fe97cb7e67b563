// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the admin API and the
//! SSE event stream.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use groupcast_config::model::GatewayConfig;
use groupcast_core::{EventSink, GroupcastError, MessagingEngine};
use groupcast_routing::{RoutingTable, RuleStore};
use groupcast_session::SessionContext;

use crate::handlers;
use crate::sink::SseSink;
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<dyn MessagingEngine>,
    pub sink: Arc<SseSink>,
    pub ctx: Arc<SessionContext>,
    pub table: Arc<RwLock<RoutingTable>>,
    pub store: Arc<dyn RuleStore>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl GatewayState {
    /// The sink as the trait object the session crate expects.
    pub fn sink_dyn(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.sink) as Arc<dyn EventSink>
    }
}

fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/events", get(sse::events_stream))
        .route("/api/status", get(handlers::get_status))
        .route("/api/groups", get(handlers::get_groups))
        .route("/api/rules", get(handlers::get_rules))
        .route("/api/rules", post(handlers::post_rule))
        .route("/api/rules/{index}", delete(handlers::delete_rule))
        .route("/api/refresh", post(handlers::post_refresh))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the gateway server and serves until the token fires.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), GroupcastError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GroupcastError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| GroupcastError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}
