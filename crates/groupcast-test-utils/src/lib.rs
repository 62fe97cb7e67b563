// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Groupcast integration tests.
//!
//! Provides a scriptable [`MockEngine`] and a recording [`MockSink`] so the
//! lifecycle controller and delivery pipeline can be exercised without a
//! real messaging engine.

pub mod mock_engine;
pub mod mock_sink;

pub use mock_engine::MockEngine;
pub use mock_sink::{MockSink, SinkRecord};
