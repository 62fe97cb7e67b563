// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits separating the relay core from its collaborators.

pub mod engine;
pub mod sink;

pub use engine::MessagingEngine;
pub use sink::EventSink;
