// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the local engine bridge process.
//!
//! [`BridgeEngine`] implements [`MessagingEngine`] over a small JSON/HTTP
//! wire: session control via `POST /session/*`, lifecycle events via a
//! long-polled `GET /events`, and media operations via per-message
//! endpoints. Binary payloads travel base64-encoded in JSON bodies.

pub mod wire;

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use groupcast_config::model::EngineConfig;
use groupcast_core::types::{ChatInfo, EngineEvent, GroupId, MediaPayload, OutgoingMedia};
use groupcast_core::{GroupcastError, MessagingEngine};

use wire::{
    ChatsResponse, DownloadResponse, EventsResponse, ForwardRequest, InitRequest,
    SendMediaRequest,
};

/// Headroom added to the long-poll wait so the client never times out a
/// request the bridge is still entitled to hold open.
const POLL_TIMEOUT_HEADROOM: Duration = Duration::from_secs(10);

/// A [`MessagingEngine`] speaking HTTP to the local bridge process.
pub struct BridgeEngine {
    client: reqwest::Client,
    base_url: String,
    auth_dir: String,
    cache_dir: String,
    event_wait_secs: u64,
    /// Events from the last long poll not yet handed to the caller.
    buffer: Mutex<VecDeque<EngineEvent>>,
}

impl BridgeEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, GroupcastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.event_wait_secs) + POLL_TIMEOUT_HEADROOM)
            .build()
            .map_err(|e| GroupcastError::Engine {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.bridge_url.trim_end_matches('/').to_string(),
            auth_dir: config.auth_dir.clone(),
            cache_dir: config.cache_dir.clone(),
            event_wait_secs: config.event_wait_secs,
            buffer: Mutex::new(VecDeque::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Converts a non-success response into an engine error carrying the
    /// bridge's body text, so corruption signatures reported by the bridge
    /// stay visible to the lifecycle controller.
    async fn error_from_response(
        operation: &str,
        response: reqwest::Response,
    ) -> GroupcastError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        GroupcastError::engine(format!("{operation} returned {status}: {body}"))
    }
}

fn transport_error(operation: &str, e: reqwest::Error) -> GroupcastError {
    GroupcastError::Engine {
        message: format!("{operation} request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl MessagingEngine for BridgeEngine {
    async fn initialize(&self) -> Result<(), GroupcastError> {
        self.buffer.lock().await.clear();

        let response = self
            .client
            .post(self.url("/session/init"))
            .json(&InitRequest {
                auth_dir: &self.auth_dir,
                cache_dir: &self.cache_dir,
            })
            .send()
            .await
            .map_err(|e| transport_error("session init", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("session init", response).await);
        }
        debug!("bridge session initialization accepted");
        Ok(())
    }

    async fn destroy(&self) -> Result<(), GroupcastError> {
        let response = self
            .client
            .post(self.url("/session/destroy"))
            .send()
            .await
            .map_err(|e| transport_error("session destroy", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("session destroy", response).await);
        }
        debug!("bridge session destroyed");
        Ok(())
    }

    /// Returns the next buffered event, long-polling the bridge when the
    /// buffer is empty. An empty batch just polls again.
    async fn next_event(&self) -> Result<EngineEvent, GroupcastError> {
        loop {
            if let Some(event) = self.buffer.lock().await.pop_front() {
                return Ok(event);
            }

            let response = self
                .client
                .get(self.url("/events"))
                .query(&[("wait", self.event_wait_secs)])
                .send()
                .await
                .map_err(|e| transport_error("event poll", e))?;

            if !response.status().is_success() {
                return Err(Self::error_from_response("event poll", response).await);
            }

            let batch: EventsResponse = response
                .json()
                .await
                .map_err(|e| transport_error("event poll", e))?;
            trace!(events = batch.events.len(), "event poll returned");

            let mut buffer = self.buffer.lock().await;
            buffer.extend(batch.events.into_iter().map(EngineEvent::from));
        }
    }

    async fn list_chats(&self) -> Result<Vec<ChatInfo>, GroupcastError> {
        let response = self
            .client
            .get(self.url("/chats"))
            .send()
            .await
            .map_err(|e| transport_error("chat listing", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("chat listing", response).await);
        }

        let body: ChatsResponse = response
            .json()
            .await
            .map_err(|e| transport_error("chat listing", e))?;
        Ok(body.chats)
    }

    async fn download_content(
        &self,
        message_id: &str,
    ) -> Result<Option<MediaPayload>, GroupcastError> {
        let response = self
            .client
            .post(self.url(&format!("/messages/{message_id}/download")))
            .send()
            .await
            .map_err(|e| transport_error("media download", e))?;

        // The bridge signals "nothing to download" with 204.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response("media download", response).await);
        }

        let body: DownloadResponse = response
            .json()
            .await
            .map_err(|e| transport_error("media download", e))?;
        let bytes = BASE64
            .decode(body.data.as_bytes())
            .map_err(|e| GroupcastError::engine(format!("media download payload invalid: {e}")))?;

        Ok(Some(MediaPayload {
            bytes,
            mime_type: body.mime_type,
        }))
    }

    async fn forward_to(&self, message_id: &str, target: &GroupId) -> Result<(), GroupcastError> {
        let response = self
            .client
            .post(self.url(&format!("/messages/{message_id}/forward")))
            .json(&ForwardRequest { target: &target.0 })
            .send()
            .await
            .map_err(|e| transport_error("forward", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("forward", response).await);
        }
        Ok(())
    }

    async fn send_media(
        &self,
        target: &GroupId,
        media: OutgoingMedia,
    ) -> Result<(), GroupcastError> {
        let bytes = tokio::fs::read(&media.path)
            .await
            .map_err(|e| GroupcastError::Engine {
                message: format!("failed to read artifact {}: {e}", media.path.display()),
                source: Some(Box::new(e)),
            })?;

        let body = SendMediaRequest {
            mime_type: media.mime_type,
            filename: media.filename,
            caption: media.caption,
            as_voice_note: media.as_voice_note,
            data: BASE64.encode(&bytes),
        };

        let response = self
            .client
            .post(self.url(&format!("/chats/{}/send-media", target.0)))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("media send", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("media send", response).await);
        }
        Ok(())
    }
}
