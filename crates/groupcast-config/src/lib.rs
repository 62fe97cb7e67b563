// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Groupcast.
//!
//! Layered TOML loading via Figment with `GROUPCAST_*` environment variable
//! overrides, plus startup validation producing actionable messages.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::GroupcastConfig;
pub use validation::validate;
