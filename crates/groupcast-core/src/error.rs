// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Groupcast relay.

use thiserror::Error;

/// Which stage of the delivery pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    /// Download-and-reupload of the original media payload.
    NativeUpload,
    /// Engine-native forward of the original message reference.
    Forward,
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStage::NativeUpload => write!(f, "native-upload"),
            DeliveryStage::Forward => write!(f, "forward"),
        }
    }
}

/// The primary error type used across Groupcast crates.
#[derive(Debug, Error)]
pub enum GroupcastError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient engine errors (chat fetch failures, generic init failures).
    /// Callers retry these with a fixed backoff.
    #[error("engine error: {message}")]
    Engine {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The engine reported an unrecoverable internal state. Recovery requires
    /// wiping the persisted auth and cache directories and a cold restart.
    #[error("session corrupted: {signature}")]
    SessionCorrupted { signature: String },

    /// Credentials were rejected. Terminal until a fresh external QR scan.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// A delivery stage failed for a single target. Never propagates past
    /// that target's attempt.
    #[error("delivery error in {stage} stage: {message}")]
    Delivery {
        stage: DeliveryStage,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Routing-table persistence failed (missing or malformed document is
    /// recovered by defaulting, so this covers genuine I/O failures).
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GroupcastError {
    /// Shorthand for a transient engine error without an underlying cause.
    pub fn engine(message: impl Into<String>) -> Self {
        GroupcastError::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a delivery-stage error without an underlying cause.
    pub fn delivery(stage: DeliveryStage, message: impl Into<String>) -> Self {
        GroupcastError::Delivery {
            stage,
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let e = GroupcastError::SessionCorrupted {
            signature: "Protocol error".into(),
        };
        assert!(e.to_string().contains("Protocol error"));

        let e = GroupcastError::delivery(DeliveryStage::NativeUpload, "empty payload");
        assert!(e.to_string().contains("native-upload"));
        assert!(e.to_string().contains("empty payload"));
    }

    #[test]
    fn stage_display() {
        assert_eq!(DeliveryStage::NativeUpload.to_string(), "native-upload");
        assert_eq!(DeliveryStage::Forward.to_string(), "forward");
    }
}
