// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the admin REST API.
//!
//! Rule mutations are applied to the in-memory table first and persisted
//! afterwards; a failed save rolls the in-memory change back so the table
//! and the document on disk cannot drift apart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use groupcast_core::types::{GroupRecord, SessionState};
use groupcast_routing::RoutingRule;
use groupcast_session::directory;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Response body for `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: SessionState,
    pub label: String,
    pub groups: usize,
    pub rules: usize,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Response body for rule listing and mutation endpoints: the full table.
#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub rules: Vec<RoutingRule>,
}

/// Response body for `POST /api/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
    pub groups: usize,
}

/// GET /health — unauthenticated liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/status — current session state plus table/directory sizes.
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    let status = state.ctx.status().await;
    Json(StatusResponse {
        state: status.state,
        label: status.label,
        groups: state.ctx.directory().await.len(),
        rules: state.table.read().await.len(),
    })
}

/// GET /api/groups — the current group directory.
pub async fn get_groups(State(state): State<GatewayState>) -> Json<Vec<GroupRecord>> {
    Json(state.ctx.directory().await)
}

/// GET /api/rules — the full routing table.
pub async fn get_rules(State(state): State<GatewayState>) -> Json<RulesResponse> {
    Json(RulesResponse {
        rules: state.table.read().await.rules().to_vec(),
    })
}

/// POST /api/rules — appends a rule, persists, returns the full table.
pub async fn post_rule(
    State(state): State<GatewayState>,
    Json(rule): Json<RoutingRule>,
) -> Response {
    if rule.source.0.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "rule source is empty");
    }
    if rule.targets.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "rule has no targets");
    }

    let mut table = state.table.write().await;
    table.add(rule);

    if let Err(e) = state.store.save(&table).await {
        // Roll back so memory and disk stay in step.
        let last = table.len() - 1;
        table.remove(last);
        warn!(error = %e, "failed to persist routing table");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("save failed: {e}"));
    }

    Json(RulesResponse {
        rules: table.rules().to_vec(),
    })
    .into_response()
}

/// DELETE /api/rules/{index} — removes a rule by position, persists,
/// returns the full table.
pub async fn delete_rule(
    State(state): State<GatewayState>,
    Path(index): Path<usize>,
) -> Response {
    let mut table = state.table.write().await;
    let Some(removed) = table.remove(index) else {
        return error_response(StatusCode::NOT_FOUND, format!("no rule at index {index}"));
    };

    if let Err(e) = state.store.save(&table).await {
        table.insert(index, removed);
        warn!(error = %e, "failed to persist routing table");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("save failed: {e}"));
    }

    Json(RulesResponse {
        rules: table.rules().to_vec(),
    })
    .into_response()
}

/// POST /api/refresh — manual directory refresh, permitted only while
/// connected.
pub async fn post_refresh(State(state): State<GatewayState>) -> Response {
    match directory::refresh_once(&state.engine, &state.sink_dyn(), &state.ctx).await {
        Ok(true) => Json(RefreshResponse {
            refreshed: true,
            groups: state.ctx.directory().await.len(),
        })
        .into_response(),
        Ok(false) => error_response(StatusCode::CONFLICT, "session is not connected"),
        Err(e) => {
            warn!(error = %e, "manual directory refresh failed");
            error_response(StatusCode::BAD_GATEWAY, format!("refresh failed: {e}"))
        }
    }
}
