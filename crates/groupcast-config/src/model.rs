// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Groupcast.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Groupcast configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupcastConfig {
    /// Messaging-engine bridge settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Session lifecycle timing and recovery settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Group directory polling settings.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Relay and delivery pipeline settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Routing-table persistence settings.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Admin gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GroupcastConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            session: SessionConfig::default(),
            directory: DirectoryConfig::default(),
            relay: RelayConfig::default(),
            rules: RulesConfig::default(),
            gateway: GatewayConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Messaging-engine bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Base URL of the local engine bridge process.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// Directory holding persisted session credentials. Deleted recursively
    /// on session corruption.
    #[serde(default = "default_auth_dir")]
    pub auth_dir: String,

    /// Directory holding the engine's browser cache. Deleted recursively
    /// on session corruption.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Long-poll wait, in seconds, for the bridge event endpoint.
    #[serde(default = "default_event_wait_secs")]
    pub event_wait_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            auth_dir: default_auth_dir(),
            cache_dir: default_cache_dir(),
            event_wait_secs: default_event_wait_secs(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8921".to_string()
}

fn default_auth_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("groupcast").join("auth"))
        .unwrap_or_else(|| std::path::PathBuf::from(".groupcast-auth"))
        .to_string_lossy()
        .into_owned()
}

fn default_cache_dir() -> String {
    dirs::cache_dir()
        .map(|p| p.join("groupcast"))
        .unwrap_or_else(|| std::path::PathBuf::from(".groupcast-cache"))
        .to_string_lossy()
        .into_owned()
}

fn default_event_wait_secs() -> u64 {
    25
}

/// Session lifecycle timing and recovery configuration.
///
/// The delays mirror the recovery design: a fixed reconnect delay after a
/// disconnect, a short cleanup pause before re-init after a corruption wipe,
/// and a generic retry delay for all other init failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Delay before re-initializing after a disconnect, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Pause between the corruption wipe and the restart delay, in seconds.
    #[serde(default = "default_repair_cleanup_delay_secs")]
    pub repair_cleanup_delay_secs: u64,

    /// Delay before re-initializing after a corruption repair, in seconds.
    #[serde(default = "default_repair_restart_delay_secs")]
    pub repair_restart_delay_secs: u64,

    /// Delay before retrying initialization after a generic failure, in seconds.
    #[serde(default = "default_init_retry_delay_secs")]
    pub init_retry_delay_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: default_reconnect_delay_secs(),
            repair_cleanup_delay_secs: default_repair_cleanup_delay_secs(),
            repair_restart_delay_secs: default_repair_restart_delay_secs(),
            init_retry_delay_secs: default_init_retry_delay_secs(),
        }
    }
}

fn default_reconnect_delay_secs() -> u64 {
    3
}

fn default_repair_cleanup_delay_secs() -> u64 {
    1
}

fn default_repair_restart_delay_secs() -> u64 {
    3
}

fn default_init_retry_delay_secs() -> u64 {
    5
}

/// Group directory polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Interval between automatic refresh attempts, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Attempt budget while the group list keeps coming back empty.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Total attempt bound once a non-empty list has been published
    /// (allows one confirmatory re-check).
    #[serde(default = "default_confirm_attempts")]
    pub confirm_attempts: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            confirm_attempts: default_confirm_attempts(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    20
}

fn default_confirm_attempts() -> u32 {
    5
}

/// Relay and delivery pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Public-facing storage root for transient re-upload artifacts.
    /// Created if absent.
    #[serde(default = "default_storage_root")]
    pub storage_root: String,

    /// Grace period before a transient artifact is deleted, in seconds.
    /// Applies regardless of delivery outcome.
    #[serde(default = "default_cleanup_grace_secs")]
    pub cleanup_grace_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            cleanup_grace_secs: default_cleanup_grace_secs(),
        }
    }
}

fn default_storage_root() -> String {
    "public/media".to_string()
}

fn default_cleanup_grace_secs() -> u64 {
    30
}

/// Routing-table persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Path of the JSON document holding the routing table.
    #[serde(default = "default_rules_path")]
    pub path: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: default_rules_path(),
        }
    }
}

fn default_rules_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("groupcast").join("rules.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("rules.json"))
        .to_string_lossy()
        .into_owned()
}

/// Admin gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8920
}
