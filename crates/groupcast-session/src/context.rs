// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared session state.
//!
//! One [`SessionContext`] exists per process. The lifecycle controller is
//! the only writer of the session status; the directory refresher writes
//! the group directory; gateway handlers read both concurrently.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use groupcast_core::types::{GroupRecord, SessionState};

/// Current machine state plus the free-text label surfaced to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub label: String,
}

/// Explicitly owned shared state for the controller, the directory
/// refresher, and API read handlers.
#[derive(Debug)]
pub struct SessionContext {
    status: RwLock<SessionStatus>,
    directory: RwLock<Vec<GroupRecord>>,
    /// Single-flight guard for disconnect-triggered recovery.
    reconnecting: AtomicBool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(SessionStatus {
                state: SessionState::Initializing,
                label: "initializing".to_string(),
            }),
            directory: RwLock::new(Vec::new()),
            reconnecting: AtomicBool::new(false),
        }
    }

    pub async fn set_state(&self, state: SessionState, label: impl Into<String>) {
        let mut status = self.status.write().await;
        status.state = state;
        status.label = label.into();
    }

    pub async fn state(&self) -> SessionState {
        self.status.read().await.state
    }

    pub async fn status(&self) -> SessionStatus {
        self.status.read().await.clone()
    }

    /// Replaces the directory wholesale. Stale entries are dropped, never
    /// merged across refresh cycles.
    pub async fn set_directory(&self, groups: Vec<GroupRecord>) {
        *self.directory.write().await = groups;
    }

    pub async fn directory(&self) -> Vec<GroupRecord> {
        self.directory.read().await.clone()
    }

    /// Claims the reconnect single-flight slot. Returns `false` when a
    /// recovery attempt is already scheduled or running.
    pub fn begin_reconnect(&self) -> bool {
        !self.reconnecting.swap(true, Ordering::SeqCst)
    }

    /// Releases the reconnect single-flight slot.
    pub fn end_reconnect(&self) {
        self.reconnecting.store(false, Ordering::SeqCst);
    }

    pub fn reconnect_in_flight(&self) -> bool {
        self.reconnecting.load(Ordering::SeqCst)
    }
}
