// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two-stage delivery pipeline.
//!
//! For each (message, rule) pair, every target in the rule gets one
//! independent delivery attempt: native re-upload first, engine-native
//! forward as the fallback. Failure of one target never blocks another;
//! side effects are limited to sink narration and one transient artifact
//! per native attempt.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use groupcast_config::model::RelayConfig;
use groupcast_core::types::{GroupId, InboundMessage, OutgoingMedia};
use groupcast_core::{DeliveryStage, EventSink, GroupcastError, MessagingEngine};
use groupcast_routing::RoutingTable;

use crate::artifact;
use crate::classifier;
use crate::media;

/// Delivers classified media messages to their rule targets.
pub struct DeliveryPipeline {
    engine: Arc<dyn MessagingEngine>,
    sink: Arc<dyn EventSink>,
    table: Arc<RwLock<RoutingTable>>,
    storage_root: PathBuf,
    cleanup_grace: Duration,
}

impl DeliveryPipeline {
    pub fn new(
        engine: Arc<dyn MessagingEngine>,
        sink: Arc<dyn EventSink>,
        table: Arc<RwLock<RoutingTable>>,
        config: &RelayConfig,
    ) -> Self {
        Self {
            engine,
            sink,
            table,
            storage_root: PathBuf::from(&config.storage_root),
            cleanup_grace: Duration::from_secs(config.cleanup_grace_secs),
        }
    }

    /// Handles one inbound message end to end: rule lookup, classification,
    /// then one delivery attempt per distinct target across all matching
    /// rules. Never returns an error; every failure path is logged and
    /// contained to the target it belongs to.
    pub async fn handle_message(&self, msg: InboundMessage) {
        if !msg.is_group {
            trace!(message_id = %msg.id, "ignoring non-group message");
            return;
        }

        // Snapshot the matching rules so delivery never holds the lock.
        let rules: Vec<_> = {
            let table = self.table.read().await;
            table.matching(&msg.chat_id).into_iter().cloned().collect()
        };
        if rules.is_empty() {
            trace!(chat_id = %msg.chat_id, "no routing rule for chat");
            return;
        }

        if !classifier::is_relayable(&msg) {
            self.sink.log_line(&format!(
                "skipping {} message in {} (not relayable media)",
                msg.kind, msg.chat_id
            ));
            return;
        }

        info!(
            message_id = %msg.id,
            chat_id = %msg.chat_id,
            kind = %msg.kind,
            rules = rules.len(),
            "relaying media message"
        );

        for rule in &rules {
            if !rule.accepts(msg.kind) {
                debug!(
                    chat_id = %msg.chat_id,
                    kind = %msg.kind,
                    "rule kind filter excludes message"
                );
                continue;
            }
            for target in &rule.targets {
                // Safety net: never relay a message back into its own chat,
                // even if a rule lists the source as a target.
                if target.0 == msg.chat_id {
                    debug!(target = %target, "skipping target equal to source");
                    continue;
                }
                self.deliver_to_target(&msg, target).await;
            }
        }
    }

    /// One target's delivery attempt: native re-upload, then forward.
    /// Both stages are contained; nothing propagates to sibling targets.
    async fn deliver_to_target(&self, msg: &InboundMessage, target: &GroupId) {
        match self.native_upload(msg, target).await {
            Ok(()) => {
                self.sink
                    .log_line(&format!("relayed media from {} to {}", msg.chat_id, target));
                return;
            }
            Err(e) => {
                warn!(
                    message_id = %msg.id,
                    target = %target,
                    error = %e,
                    "native re-upload failed, falling back to forward"
                );
                self.sink.log_line(&format!(
                    "native re-upload to {target} failed ({e}), forwarding instead"
                ));
            }
        }

        match self.engine.forward_to(&msg.id, target).await {
            Ok(()) => {
                self.sink
                    .log_line(&format!("forwarded message {} to {}", msg.id, target));
            }
            Err(e) => {
                // Best effort: log and move on to the remaining targets.
                warn!(
                    message_id = %msg.id,
                    target = %target,
                    error = %e,
                    "forward fallback failed"
                );
                self.sink
                    .log_line(&format!("forward of {} to {target} failed: {e}", msg.id));
            }
        }
    }

    /// Stage 1: download the payload, persist it as a transient artifact,
    /// and re-send it as fresh media with the originally observed MIME type
    /// and filename.
    async fn native_upload(
        &self,
        msg: &InboundMessage,
        target: &GroupId,
    ) -> Result<(), GroupcastError> {
        if !msg.has_media {
            return Err(GroupcastError::delivery(
                DeliveryStage::NativeUpload,
                "message exposes no downloadable content",
            ));
        }

        let payload = self
            .engine
            .download_content(&msg.id)
            .await?
            .ok_or_else(|| {
                GroupcastError::delivery(DeliveryStage::NativeUpload, "payload absent")
            })?;
        if payload.bytes.is_empty() {
            return Err(GroupcastError::delivery(
                DeliveryStage::NativeUpload,
                "payload empty",
            ));
        }

        let extension = media::extension_for_mime(&payload.mime_type);
        let artifact = artifact::write_artifact(
            &self.storage_root,
            &payload.bytes,
            &extension,
            &payload.mime_type,
        )
        .await?;

        // Deletion is scheduled up front so it happens regardless of how
        // the send below turns out.
        artifact::schedule_cleanup(artifact.path.clone(), self.cleanup_grace);

        let outgoing = OutgoingMedia {
            path: artifact.path.clone(),
            mime_type: artifact.mime_type.clone(),
            filename: artifact.filename(),
            caption: if msg.body.is_empty() {
                None
            } else {
                Some(msg.body.clone())
            },
            as_voice_note: msg.kind.is_voice(),
        };

        self.engine.send_media(target, outgoing).await?;
        debug!(
            message_id = %msg.id,
            target = %target,
            size = artifact.size_bytes,
            "native re-upload complete"
        );
        Ok(())
    }
}
