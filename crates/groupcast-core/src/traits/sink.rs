// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The observer-facing event sink.
//!
//! All methods are fire-and-forget: no acknowledgment, no delivery
//! guarantee. Observers that connect late receive only current snapshot
//! state, never history; retaining that snapshot is the sink
//! implementation's concern.

use crate::types::GroupRecord;

/// Receives human-readable progress lines and structured events.
pub trait EventSink: Send + Sync {
    /// The session status label changed.
    fn status(&self, label: &str);

    /// A QR challenge payload (data URL) to display for scanning.
    fn qr_code(&self, image_data_url: &str);

    /// The session became fully ready.
    fn ready_signal(&self);

    /// Instructs observers to discard any cached "ready" UI state.
    fn reset_signal(&self);

    /// A human-readable progress/log line.
    fn log_line(&self, text: &str);

    /// A wholesale snapshot of the group directory.
    fn groups_snapshot(&self, groups: &[GroupRecord]);
}

/// A sink that drops everything. Useful as a default and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn status(&self, _label: &str) {}
    fn qr_code(&self, _image_data_url: &str) {}
    fn ready_signal(&self) {}
    fn reset_signal(&self) {}
    fn log_line(&self, _text: &str) {}
    fn groups_snapshot(&self, _groups: &[GroupRecord]) {}
}
