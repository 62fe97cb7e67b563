// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording event sink for assertions in tests.

use std::sync::Mutex;

use groupcast_core::types::GroupRecord;
use groupcast_core::EventSink;

/// One recorded sink event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRecord {
    Status(String),
    Qr(String),
    Ready,
    Reset,
    Log(String),
    Groups(Vec<GroupRecord>),
}

/// An [`EventSink`] that records everything it receives.
#[derive(Debug, Default)]
pub struct MockSink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().expect("sink lock poisoned").clone()
    }

    /// All status labels, in emission order.
    pub fn statuses(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Status(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    /// All log lines, in emission order.
    pub fn logs(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    /// Number of group snapshots published.
    pub fn snapshot_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, SinkRecord::Groups(_)))
            .count()
    }

    /// Number of QR challenges emitted.
    pub fn qr_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, SinkRecord::Qr(_)))
            .count()
    }

    /// Number of reset signals emitted.
    pub fn reset_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, SinkRecord::Reset))
            .count()
    }

    fn push(&self, record: SinkRecord) {
        self.records.lock().expect("sink lock poisoned").push(record);
    }
}

impl EventSink for MockSink {
    fn status(&self, label: &str) {
        self.push(SinkRecord::Status(label.to_string()));
    }

    fn qr_code(&self, image_data_url: &str) {
        self.push(SinkRecord::Qr(image_data_url.to_string()));
    }

    fn ready_signal(&self) {
        self.push(SinkRecord::Ready);
    }

    fn reset_signal(&self) {
        self.push(SinkRecord::Reset);
    }

    fn log_line(&self, text: &str) {
        self.push(SinkRecord::Log(text.to_string()));
    }

    fn groups_snapshot(&self, groups: &[GroupRecord]) {
        self.push(SinkRecord::Groups(groups.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_preserve_order() {
        let sink = MockSink::new();
        sink.status("initializing");
        sink.qr_code("data:image/png;base64,abc");
        sink.ready_signal();
        sink.log_line("hello");

        let records = sink.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0], SinkRecord::Status("initializing".into()));
        assert_eq!(sink.statuses(), vec!["initializing"]);
        assert_eq!(sink.qr_count(), 1);
        assert_eq!(sink.logs(), vec!["hello"]);
    }
}
