// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process wiring: constructs the bridge engine, routing table, lifecycle
//! controller, delivery pipeline, and gateway, then serves until a shutdown
//! signal arrives.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, RwLock};
use tracing::info;

use groupcast_bridge::BridgeEngine;
use groupcast_config::GroupcastConfig;
use groupcast_core::{EventSink, GroupcastError, MessagingEngine};
use groupcast_gateway::{GatewayState, SseSink};
use groupcast_relay::DeliveryPipeline;
use groupcast_routing::{JsonRuleStore, RuleStore};
use groupcast_session::{ControllerSettings, LifecycleController, SessionContext};

use crate::shutdown;

/// Capacity of the inbound message channel between the lifecycle controller
/// and the relay worker.
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Runs the relay daemon until SIGINT/SIGTERM.
pub async fn run_serve(config: GroupcastConfig) -> Result<(), GroupcastError> {
    init_tracing(&config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting groupcast");

    let cancel = shutdown::install_signal_handler();

    let store: Arc<dyn RuleStore> =
        Arc::new(JsonRuleStore::new(PathBuf::from(&config.rules.path)));
    let table = Arc::new(RwLock::new(store.load().await?));
    info!(rules = table.read().await.len(), "routing table loaded");

    let sink = Arc::new(SseSink::new());
    let sink_dyn: Arc<dyn EventSink> = Arc::clone(&sink) as _;

    let engine: Arc<dyn MessagingEngine> = Arc::new(BridgeEngine::new(&config.engine)?);
    let ctx = Arc::new(SessionContext::new());

    let (message_tx, message_rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);

    let pipeline = Arc::new(DeliveryPipeline::new(
        Arc::clone(&engine),
        Arc::clone(&sink_dyn),
        Arc::clone(&table),
        &config.relay,
    ));
    let relay_handle = tokio::spawn(groupcast_relay::run_worker(
        message_rx,
        pipeline,
        cancel.clone(),
    ));

    let controller = LifecycleController::new(
        Arc::clone(&engine),
        Arc::clone(&sink_dyn),
        Arc::clone(&ctx),
        ControllerSettings::from_config(&config),
        message_tx,
    );
    let controller_handle = tokio::spawn(controller.run(cancel.clone()));

    let state = GatewayState {
        engine,
        sink,
        ctx,
        table,
        store,
        start_time: Instant::now(),
    };
    let serve_result = groupcast_gateway::start_server(&config.gateway, state, cancel.clone()).await;

    // The gateway returns on shutdown or bind failure; either way the
    // workers must stop before the process exits.
    cancel.cancel();
    let _ = controller_handle.await;
    let _ = relay_handle.await;

    info!("groupcast shutdown complete");
    serve_result
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("groupcast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
