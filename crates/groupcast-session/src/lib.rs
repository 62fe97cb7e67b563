// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle management for Groupcast.
//!
//! The [`LifecycleController`] owns the engine connection: it drives
//! initialization (with corruption self-repair), consumes the engine's
//! lifecycle event stream, schedules recovery after disconnects, and starts
//! the group-directory refresh loop on each connect. Shared state lives in
//! [`SessionContext`], readable by the gateway under concurrent mutation.

pub mod context;
pub mod controller;
pub mod directory;

pub use context::{SessionContext, SessionStatus};
pub use controller::{ControllerSettings, LifecycleController, CORRUPTION_SIGNATURES};
pub use directory::{refresh_once, DirectorySettings};
