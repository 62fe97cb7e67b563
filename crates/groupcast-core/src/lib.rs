// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Groupcast media relay.
//!
//! This crate provides the error taxonomy, shared types, and the boundary
//! traits between the relay core and its external collaborators (the
//! messaging engine and the observer event sink). All other workspace
//! crates build on the definitions here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DeliveryStage, GroupcastError};
pub use traits::{EventSink, MessagingEngine};
pub use types::{
    ChatInfo, EngineEvent, GroupId, GroupRecord, InboundMessage, MediaKind, MediaPayload,
    OutgoingMedia, SessionState,
};
