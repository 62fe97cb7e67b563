// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The messaging-engine boundary.
//!
//! The engine is an opaque external capability (in production, a
//! browser-automation process behind a local HTTP bridge). The lifecycle
//! controller drives it through this trait and never assumes anything about
//! its internals beyond the events and operations declared here.

use async_trait::async_trait;

use crate::error::GroupcastError;
use crate::types::{ChatInfo, EngineEvent, GroupId, MediaPayload, OutgoingMedia};

/// Operations exposed by the underlying messaging engine.
#[async_trait]
pub trait MessagingEngine: Send + Sync {
    /// Starts (or restarts) the engine session. May emit corruption errors
    /// whose messages match known signatures; the controller handles those
    /// with a credential/cache wipe.
    async fn initialize(&self) -> Result<(), GroupcastError>;

    /// Tears down the engine instance. Best-effort at call sites that are
    /// already on a failure path.
    async fn destroy(&self) -> Result<(), GroupcastError>;

    /// Awaits the next lifecycle or message event. Events arrive in engine
    /// order; no further ordering is implied.
    async fn next_event(&self) -> Result<EngineEvent, GroupcastError>;

    /// Fetches the full chat list.
    async fn list_chats(&self) -> Result<Vec<ChatInfo>, GroupcastError>;

    /// Downloads the payload of a message, if it has one. `None` when the
    /// engine reports no downloadable content.
    async fn download_content(
        &self,
        message_id: &str,
    ) -> Result<Option<MediaPayload>, GroupcastError>;

    /// Forwards an existing message to a target using the engine's native
    /// resend capability.
    async fn forward_to(&self, message_id: &str, target: &GroupId) -> Result<(), GroupcastError>;

    /// Sends freshly re-uploaded media to a target.
    async fn send_media(
        &self,
        target: &GroupId,
        media: OutgoingMedia,
    ) -> Result<(), GroupcastError>;
}
