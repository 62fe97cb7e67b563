// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay core for Groupcast: classification and delivery.
//!
//! The [`DeliveryPipeline`] consumes inbound messages the lifecycle
//! controller hands over, consults the routing table, and delivers matched
//! media to each rule target with a native-reupload-then-forward strategy.
//! Distinct messages relay concurrently; targets of one message are
//! attempted sequentially with per-target failure isolation.

pub mod artifact;
pub mod classifier;
pub mod media;
pub mod pipeline;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use groupcast_core::types::InboundMessage;

pub use artifact::TemporaryArtifact;
pub use pipeline::DeliveryPipeline;

/// Drains the inbound message channel, spawning one relay task per message.
///
/// There is no ordering guarantee between distinct messages and no mutual
/// exclusion: the routing table is read-only during relay.
pub async fn run_worker(
    mut rx: mpsc::Receiver<InboundMessage>,
    pipeline: Arc<DeliveryPipeline>,
    cancel: CancellationToken,
) {
    info!("relay worker running");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(msg) => {
                    let pipeline = Arc::clone(&pipeline);
                    tokio::spawn(async move {
                        pipeline.handle_message(msg).await;
                    });
                }
                None => break,
            },
        }
    }
    info!("relay worker stopped");
}
