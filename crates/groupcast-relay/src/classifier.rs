// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message classification.
//!
//! A message is relayable media when its declared type is image, video, or
//! gif, or when it is a document whose MIME type sniffs as image or video
//! (files sent as generic attachments). Classification is pure: rule lookup
//! and side effects live in the pipeline.

use groupcast_core::types::{InboundMessage, MediaKind};

/// Whether a declared kind plus reported MIME type qualifies as relayable media.
pub fn is_relayable_media(kind: MediaKind, mime_type: Option<&str>) -> bool {
    if kind.is_direct_media() {
        return true;
    }
    if kind == MediaKind::Document {
        return promoted_from_document(mime_type);
    }
    false
}

/// Whether a document's MIME type promotes it to media.
fn promoted_from_document(mime_type: Option<&str>) -> bool {
    match mime_type {
        Some(mime) => mime.starts_with("image/") || mime.starts_with("video/"),
        None => false,
    }
}

/// Convenience wrapper over [`is_relayable_media`] for a full message.
pub fn is_relayable(msg: &InboundMessage) -> bool {
    is_relayable_media(msg.kind, msg.mime_type.as_deref())
}
