// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The SSE-backed event sink.
//!
//! Sink calls fan out over a tokio broadcast channel to every connected
//! `/events` subscriber. A retained snapshot (last status, last QR, current
//! groups, ready flag, recent log lines) lets late joiners catch up before
//! receiving live events. Emission is fire-and-forget: a sink call with no
//! subscribers is not an error.

use std::collections::VecDeque;
use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::broadcast;

use groupcast_core::types::GroupRecord;
use groupcast_core::EventSink;

/// Bound on retained log lines replayed to late joiners.
const LOG_RING_CAPACITY: usize = 100;

const CHANNEL_CAPACITY: usize = 256;

/// One event on the `/events` stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkEvent {
    Status { label: String },
    Qr { data_url: String },
    Ready,
    Reset,
    Log { line: String },
    Groups { groups: Vec<GroupRecord> },
}

#[derive(Debug, Default)]
struct Snapshot {
    status: Option<String>,
    qr: Option<String>,
    ready: bool,
    groups: Vec<GroupRecord>,
    logs: VecDeque<String>,
}

/// [`EventSink`] implementation broadcasting to SSE subscribers.
#[derive(Debug)]
pub struct SseSink {
    tx: broadcast::Sender<SinkEvent>,
    snapshot: RwLock<Snapshot>,
}

impl Default for SseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SseSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SinkEvent> {
        self.tx.subscribe()
    }

    /// The retained state as a sequence of events, replayed to a new
    /// subscriber before live delivery starts.
    pub fn snapshot_events(&self) -> Vec<SinkEvent> {
        let mut events = Vec::new();
        match self.snapshot.read() {
            Ok(snapshot) => {
                if let Some(label) = &snapshot.status {
                    events.push(SinkEvent::Status {
                        label: label.clone(),
                    });
                }
                if let Some(data_url) = &snapshot.qr {
                    events.push(SinkEvent::Qr {
                        data_url: data_url.clone(),
                    });
                }
                if !snapshot.groups.is_empty() {
                    events.push(SinkEvent::Groups {
                        groups: snapshot.groups.clone(),
                    });
                }
                if snapshot.ready {
                    events.push(SinkEvent::Ready);
                }
                for line in &snapshot.logs {
                    events.push(SinkEvent::Log { line: line.clone() });
                }
            }
            Err(poisoned) => {
                // A panicked writer cannot corrupt this read-only view.
                drop(poisoned);
            }
        }
        events
    }

    fn emit(&self, event: SinkEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    fn with_snapshot(&self, f: impl FnOnce(&mut Snapshot)) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            f(&mut snapshot);
        }
    }
}

impl EventSink for SseSink {
    fn status(&self, label: &str) {
        self.with_snapshot(|s| s.status = Some(label.to_string()));
        self.emit(SinkEvent::Status {
            label: label.to_string(),
        });
    }

    fn qr_code(&self, data_url: &str) {
        self.with_snapshot(|s| s.qr = Some(data_url.to_string()));
        self.emit(SinkEvent::Qr {
            data_url: data_url.to_string(),
        });
    }

    fn ready_signal(&self) {
        // Ready supersedes any pending QR challenge.
        self.with_snapshot(|s| {
            s.ready = true;
            s.qr = None;
        });
        self.emit(SinkEvent::Ready);
    }

    fn reset_signal(&self) {
        self.with_snapshot(|s| {
            s.ready = false;
            s.qr = None;
        });
        self.emit(SinkEvent::Reset);
    }

    fn log_line(&self, line: &str) {
        self.with_snapshot(|s| {
            if s.logs.len() == LOG_RING_CAPACITY {
                s.logs.pop_front();
            }
            s.logs.push_back(line.to_string());
        });
        self.emit(SinkEvent::Log {
            line: line.to_string(),
        });
    }

    fn groups_snapshot(&self, groups: &[GroupRecord]) {
        self.with_snapshot(|s| s.groups = groups.to_vec());
        self.emit(SinkEvent::Groups {
            groups: groups.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_joiner_receives_retained_state() {
        let sink = SseSink::new();
        sink.status("awaiting QR scan");
        sink.qr_code("data:image/png;base64,AAAA");
        sink.log_line("engine initialization started");

        let events = sink.snapshot_events();
        assert!(matches!(&events[0], SinkEvent::Status { label } if label == "awaiting QR scan"));
        assert!(matches!(&events[1], SinkEvent::Qr { .. }));
        assert!(matches!(&events[2], SinkEvent::Log { .. }));
    }

    #[test]
    fn ready_clears_the_pending_qr() {
        let sink = SseSink::new();
        sink.qr_code("data:image/png;base64,AAAA");
        sink.ready_signal();

        let events = sink.snapshot_events();
        assert!(events.iter().all(|e| !matches!(e, SinkEvent::Qr { .. })));
        assert!(events.iter().any(|e| matches!(e, SinkEvent::Ready)));
    }

    #[test]
    fn reset_clears_the_ready_flag() {
        let sink = SseSink::new();
        sink.ready_signal();
        sink.reset_signal();

        let events = sink.snapshot_events();
        assert!(events.iter().all(|e| !matches!(e, SinkEvent::Ready)));
    }

    #[test]
    fn log_ring_is_bounded() {
        let sink = SseSink::new();
        for i in 0..(LOG_RING_CAPACITY + 10) {
            sink.log_line(&format!("line {i}"));
        }

        let logs: Vec<_> = sink
            .snapshot_events()
            .into_iter()
            .filter(|e| matches!(e, SinkEvent::Log { .. }))
            .collect();
        assert_eq!(logs.len(), LOG_RING_CAPACITY);
        assert!(matches!(&logs[0], SinkEvent::Log { line } if line == "line 10"));
    }

    #[tokio::test]
    async fn subscribers_receive_live_events() {
        let sink = SseSink::new();
        let mut rx = sink.subscribe();
        sink.status("connected");

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SinkEvent::Status { label } if label == "connected"));
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&SinkEvent::Status {
            label: "connected".into(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"status""#));

        let json = serde_json::to_string(&SinkEvent::Ready).unwrap();
        assert!(json.contains(r#""type":"ready""#));
    }
}
