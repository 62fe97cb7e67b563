// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the engine bridge protocol.
//!
//! The bridge process speaks plain JSON over HTTP: lifecycle events come
//! back from a long-polled `/events` endpoint as a tagged enum, and binary
//! payloads travel base64-encoded inside JSON bodies.

use serde::{Deserialize, Serialize};

use groupcast_core::types::{ChatInfo, EngineEvent, InboundMessage};

/// Body of `POST /session/init`. The bridge persists session data under
/// these directories; they are wiped on corruption repair.
#[derive(Debug, Serialize)]
pub struct InitRequest<'a> {
    pub auth_dir: &'a str,
    pub cache_dir: &'a str,
}

/// One lifecycle or message event from `GET /events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    Qr { data_url: String },
    Authenticated,
    Ready,
    AuthFailure { reason: String },
    Disconnected { reason: String },
    FatalError { message: String },
    Message { message: InboundMessage },
}

impl From<BridgeEvent> for EngineEvent {
    fn from(event: BridgeEvent) -> Self {
        match event {
            BridgeEvent::Qr { data_url } => EngineEvent::QrChallenge(data_url),
            BridgeEvent::Authenticated => EngineEvent::Authenticated,
            BridgeEvent::Ready => EngineEvent::Ready,
            BridgeEvent::AuthFailure { reason } => EngineEvent::AuthFailure(reason),
            BridgeEvent::Disconnected { reason } => EngineEvent::Disconnected(reason),
            BridgeEvent::FatalError { message } => EngineEvent::FatalError(message),
            BridgeEvent::Message { message } => EngineEvent::Message(message),
        }
    }
}

/// Body of a `GET /events` response. An empty batch means the long poll
/// timed out with nothing to report.
#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<BridgeEvent>,
}

/// Body of a `GET /chats` response.
#[derive(Debug, Deserialize)]
pub struct ChatsResponse {
    #[serde(default)]
    pub chats: Vec<ChatInfo>,
}

/// Body of a `POST /messages/{id}/download` response. Absent payloads are
/// signalled by HTTP 204, not by this type.
#[derive(Debug, Deserialize)]
pub struct DownloadResponse {
    pub mime_type: String,
    /// Base64-encoded payload bytes.
    pub data: String,
}

/// Body of `POST /messages/{id}/forward`.
#[derive(Debug, Serialize)]
pub struct ForwardRequest<'a> {
    pub target: &'a str,
}

/// Body of `POST /chats/{id}/send-media`.
#[derive(Debug, Serialize)]
pub struct SendMediaRequest {
    pub mime_type: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub as_voice_note: bool,
    /// Base64-encoded payload bytes.
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupcast_core::types::MediaKind;

    #[test]
    fn events_deserialize_from_tagged_json() {
        let json = r#"{"events": [
            {"type": "qr", "data_url": "data:image/png;base64,AAAA"},
            {"type": "ready"},
            {"type": "disconnected", "reason": "stream closed"},
            {"type": "message", "message": {
                "id": "m1", "chat_id": "g1", "is_group": true,
                "kind": "image", "mime_type": "image/jpeg", "has_media": true
            }}
        ]}"#;

        let parsed: EventsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.events.len(), 4);

        let events: Vec<EngineEvent> = parsed.events.into_iter().map(Into::into).collect();
        assert!(matches!(&events[0], EngineEvent::QrChallenge(url) if url.starts_with("data:")));
        assert!(matches!(events[1], EngineEvent::Ready));
        assert!(matches!(&events[2], EngineEvent::Disconnected(r) if r == "stream closed"));
        match &events[3] {
            EngineEvent::Message(msg) => {
                assert_eq!(msg.kind, MediaKind::Image);
                assert!(msg.has_media);
            }
            other => panic!("expected message event, got {other:?}"),
        }
    }

    #[test]
    fn empty_events_body_is_an_empty_batch() {
        let parsed: EventsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn send_media_omits_absent_caption() {
        let body = SendMediaRequest {
            mime_type: "image/png".into(),
            filename: "media-1.png".into(),
            caption: None,
            as_voice_note: false,
            data: "AAAA".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("caption"));
    }
}
