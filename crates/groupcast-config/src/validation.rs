// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup validation for loaded configuration.

use groupcast_core::GroupcastError;

use crate::model::GroupcastConfig;

/// Validates a loaded configuration, returning the first problem found.
///
/// Checks are limited to mistakes that would otherwise surface as confusing
/// runtime failures deep inside the relay.
pub fn validate(config: &GroupcastConfig) -> Result<(), GroupcastError> {
    if config.gateway.port == 0 {
        return Err(GroupcastError::Config(
            "gateway.port must be nonzero".to_string(),
        ));
    }

    if config.engine.bridge_url.is_empty() {
        return Err(GroupcastError::Config(
            "engine.bridge_url must not be empty".to_string(),
        ));
    }
    if !config.engine.bridge_url.starts_with("http://")
        && !config.engine.bridge_url.starts_with("https://")
    {
        return Err(GroupcastError::Config(format!(
            "engine.bridge_url must be an http(s) URL, got {:?}",
            config.engine.bridge_url
        )));
    }

    if config.relay.storage_root.is_empty() {
        return Err(GroupcastError::Config(
            "relay.storage_root must not be empty".to_string(),
        ));
    }

    if config.directory.max_attempts == 0 || config.directory.confirm_attempts == 0 {
        return Err(GroupcastError::Config(
            "directory attempt budgets must be nonzero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&GroupcastConfig::default()).is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = GroupcastConfig::default();
        config.gateway.port = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("gateway.port"));
    }

    #[test]
    fn non_http_bridge_url_is_rejected() {
        let mut config = GroupcastConfig::default();
        config.engine.bridge_url = "ftp://bridge".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_attempt_budget_is_rejected() {
        let mut config = GroupcastConfig::default();
        config.directory.max_attempts = 0;
        assert!(validate(&config).is_err());
    }
}
