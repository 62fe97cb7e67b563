// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP gateway for Groupcast.
//!
//! Serves the rule-management REST API, session status, the manual
//! directory refresh, and a Server-Sent Events stream of sink events.
//! [`SseSink`] is the process's [`EventSink`](groupcast_core::EventSink)
//! implementation: the lifecycle controller and delivery pipeline write to
//! it, connected SSE clients read from it.

pub mod handlers;
pub mod server;
pub mod sink;
pub mod sse;

pub use server::{start_server, GatewayState};
pub use sink::{SinkEvent, SseSink};
