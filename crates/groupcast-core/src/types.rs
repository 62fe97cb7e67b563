// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Groupcast workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable identifier of a multi-party chat (group).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        GroupId(s)
    }
}

/// Declared type of an inbound message, as reported by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
    Audio,
    Voice,
    Document,
    Sticker,
    Text,
    Other,
}

impl MediaKind {
    /// Whether this kind is relayable media by declaration alone.
    /// Documents may still be promoted by MIME sniffing.
    pub fn is_direct_media(self) -> bool {
        matches!(self, MediaKind::Image | MediaKind::Video | MediaKind::Gif)
    }

    /// Whether the kind carries voice-note semantics when re-uploaded.
    pub fn is_voice(self) -> bool {
        matches!(self, MediaKind::Audio | MediaKind::Voice)
    }
}

/// A group known to the directory: id plus current display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
}

/// A chat entry as returned by the engine's chat listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: String,
    pub is_group: bool,
    pub name: String,
}

/// States of the session lifecycle state machine.
///
/// Exactly one instance exists process-wide, owned by the session context
/// and mutated only by the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initializing,
    AwaitingScan,
    Authenticated,
    Connected,
    Disconnected,
    AuthFailed,
    FatalError,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::AwaitingScan => write!(f, "awaiting_scan"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::Connected => write!(f, "connected"),
            SessionState::Disconnected => write!(f, "disconnected"),
            SessionState::AuthFailed => write!(f, "auth_failed"),
            SessionState::FatalError => write!(f, "fatal_error"),
        }
    }
}

/// An inbound message observed by the engine.
///
/// Ephemeral: exists only for the duration of one relay attempt and is
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Engine-assigned message id, used for download and forward operations.
    pub id: String,
    /// Chat the message was observed in.
    pub chat_id: String,
    /// Whether the chat is a group.
    pub is_group: bool,
    /// Declared message type.
    pub kind: MediaKind,
    /// Reported MIME type, when the message carries content.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Caption or text body.
    #[serde(default)]
    pub body: String,
    /// Whether the engine can download a payload for this message.
    #[serde(default)]
    pub has_media: bool,
}

/// Raw media payload downloaded from the engine.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Media to be sent to a target, re-uploaded from a local artifact.
///
/// The MIME type and filename are forced to the originally observed values;
/// nothing is re-inferred from the on-disk file.
#[derive(Debug, Clone)]
pub struct OutgoingMedia {
    pub path: std::path::PathBuf,
    pub mime_type: String,
    pub filename: String,
    pub caption: Option<String>,
    /// Apply voice-note semantics on send.
    pub as_voice_note: bool,
}

/// Lifecycle and message events emitted by the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A QR challenge to display. Re-emitted on every new challenge.
    QrChallenge(String),
    /// Credentials were accepted.
    Authenticated,
    /// Handshake complete; the session is fully usable.
    Ready,
    /// Credentials were rejected.
    AuthFailure(String),
    /// The engine lost its connection.
    Disconnected(String),
    /// Unrecoverable engine-internal failure.
    FatalError(String),
    /// An inbound message was observed.
    Message(InboundMessage),
}
