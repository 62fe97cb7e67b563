// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events stream for `GET /events`.
//!
//! New subscribers receive the retained snapshot (status, QR, groups,
//! ready flag, recent log lines) first, then live sink events. The
//! subscription is opened before the snapshot is read, so an event emitted
//! in between may arrive twice but can never be missed.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;
use tracing::debug;

use crate::server::GatewayState;
use crate::sink::{SinkEvent, SseSink};

fn event_name(event: &SinkEvent) -> &'static str {
    match event {
        SinkEvent::Status { .. } => "status",
        SinkEvent::Qr { .. } => "qr",
        SinkEvent::Ready => "ready",
        SinkEvent::Reset => "reset",
        SinkEvent::Log { .. } => "log",
        SinkEvent::Groups { .. } => "groups",
    }
}

fn to_sse_event(event: SinkEvent) -> Result<Event, Infallible> {
    let name = event_name(&event);
    let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().event(name).data(data))
}

/// Snapshot-first event stream for one subscriber.
fn subscriber_stream(sink: &SseSink) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
    let rx = sink.subscribe();
    let snapshot = sink.snapshot_events();

    let initial = stream::iter(snapshot.into_iter().map(to_sse_event));
    let live = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((to_sse_event(event), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "sse subscriber lagged, skipping");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    initial.chain(live)
}

/// GET /events — the admin event stream.
pub async fn events_stream(
    State(state): State<GatewayState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(subscriber_stream(&state.sink)).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupcast_core::EventSink;

    #[tokio::test]
    async fn late_joiner_gets_snapshot_then_live_events() {
        let sink = SseSink::new();
        sink.status("awaiting QR scan");
        sink.qr_code("data:image/png;base64,AAAA");

        let mut stream = Box::pin(subscriber_stream(&sink));

        // Snapshot first.
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());

        // Then live delivery.
        sink.ready_signal();
        assert!(stream.next().await.is_some());
    }

    #[test]
    fn event_names_cover_every_variant() {
        assert_eq!(
            event_name(&SinkEvent::Status {
                label: "x".into()
            }),
            "status"
        );
        assert_eq!(event_name(&SinkEvent::Ready), "ready");
        assert_eq!(event_name(&SinkEvent::Reset), "reset");
        assert_eq!(event_name(&SinkEvent::Groups { groups: vec![] }), "groups");
    }
}
