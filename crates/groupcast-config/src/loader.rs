// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./groupcast.toml` > `~/.config/groupcast/groupcast.toml`
//! > `/etc/groupcast/groupcast.toml` with environment variable overrides via
//! the `GROUPCAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GroupcastConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/groupcast/groupcast.toml` (system-wide)
/// 3. `~/.config/groupcast/groupcast.toml` (user XDG config)
/// 4. `./groupcast.toml` (local directory)
/// 5. `GROUPCAST_*` environment variables
pub fn load_config() -> Result<GroupcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GroupcastConfig::default()))
        .merge(Toml::file("/etc/groupcast/groupcast.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("groupcast/groupcast.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("groupcast.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GroupcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GroupcastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GroupcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GroupcastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `GROUPCAST_RELAY_STORAGE_ROOT` must map
/// to `relay.storage_root`, not `relay.storage.root`.
fn env_provider() -> Env {
    Env::prefixed("GROUPCAST_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("session_", "session.", 1)
            .replacen("directory_", "directory.", 1)
            .replacen("relay_", "relay.", 1)
            .replacen("rules_", "rules.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
