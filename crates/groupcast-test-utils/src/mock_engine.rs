// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging engine for deterministic testing.
//!
//! Lifecycle events are injected via [`MockEngine::push_event`] and returned
//! by `next_event()` in order. Initialization failures can be scripted, and
//! per-target send/forward failures can be injected to exercise the delivery
//! pipeline's failure isolation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use groupcast_core::types::{ChatInfo, EngineEvent, GroupId, MediaPayload, OutgoingMedia};
use groupcast_core::{GroupcastError, MessagingEngine};

/// A scriptable in-memory engine.
#[derive(Default)]
pub struct MockEngine {
    events: Mutex<VecDeque<EngineEvent>>,
    notify: Notify,
    chats: Mutex<Vec<ChatInfo>>,
    /// Payloads by message id, returned from `download_content`.
    payloads: Mutex<HashMap<String, MediaPayload>>,
    /// Scripted initialization outcomes, consumed front to back.
    /// An empty queue means initialization succeeds.
    init_errors: Mutex<VecDeque<GroupcastError>>,
    /// Target ids for which `send_media` fails.
    failing_send_targets: Mutex<HashSet<String>>,
    /// Target ids for which `forward_to` fails.
    failing_forward_targets: Mutex<HashSet<String>>,
    /// Captured sends and forwards.
    sent_media: Mutex<Vec<(GroupId, OutgoingMedia)>>,
    forwards: Mutex<Vec<(String, GroupId)>>,
    init_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
    list_chat_calls: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a lifecycle or message event for `next_event()`.
    pub async fn push_event(&self, event: EngineEvent) {
        self.events.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Sets the chat list returned by `list_chats()`.
    pub async fn set_chats(&self, chats: Vec<ChatInfo>) {
        *self.chats.lock().await = chats;
    }

    /// Registers a downloadable payload for a message id.
    pub async fn set_payload(&self, message_id: &str, payload: MediaPayload) {
        self.payloads
            .lock()
            .await
            .insert(message_id.to_string(), payload);
    }

    /// Scripts the next initialization attempts to fail with the given
    /// errors, in order. Subsequent attempts succeed.
    pub async fn script_init_errors(&self, errors: Vec<GroupcastError>) {
        self.init_errors.lock().await.extend(errors);
    }

    /// Makes `send_media` fail for the given target id.
    pub async fn fail_sends_to(&self, target: &str) {
        self.failing_send_targets
            .lock()
            .await
            .insert(target.to_string());
    }

    /// Makes `forward_to` fail for the given target id.
    pub async fn fail_forwards_to(&self, target: &str) {
        self.failing_forward_targets
            .lock()
            .await
            .insert(target.to_string());
    }

    pub async fn sent_media(&self) -> Vec<(GroupId, OutgoingMedia)> {
        self.sent_media.lock().await.clone()
    }

    pub async fn forwards(&self) -> Vec<(String, GroupId)> {
        self.forwards.lock().await.clone()
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    pub fn list_chat_calls(&self) -> usize {
        self.list_chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagingEngine for MockEngine {
    async fn initialize(&self) -> Result<(), GroupcastError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match self.init_errors.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn destroy(&self) -> Result<(), GroupcastError> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_event(&self) -> Result<EngineEvent, GroupcastError> {
        loop {
            {
                let mut queue = self.events.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn list_chats(&self) -> Result<Vec<ChatInfo>, GroupcastError> {
        self.list_chat_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chats.lock().await.clone())
    }

    async fn download_content(
        &self,
        message_id: &str,
    ) -> Result<Option<MediaPayload>, GroupcastError> {
        Ok(self.payloads.lock().await.get(message_id).cloned())
    }

    async fn forward_to(&self, message_id: &str, target: &GroupId) -> Result<(), GroupcastError> {
        if self.failing_forward_targets.lock().await.contains(&target.0) {
            return Err(GroupcastError::engine(format!(
                "injected forward failure for {target}"
            )));
        }
        self.forwards
            .lock()
            .await
            .push((message_id.to_string(), target.clone()));
        Ok(())
    }

    async fn send_media(
        &self,
        target: &GroupId,
        media: OutgoingMedia,
    ) -> Result<(), GroupcastError> {
        if self.failing_send_targets.lock().await.contains(&target.0) {
            return Err(GroupcastError::engine(format!(
                "injected send failure for {target}"
            )));
        }
        self.sent_media.lock().await.push((target.clone(), media));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_come_back_in_order() {
        let engine = MockEngine::new();
        engine.push_event(EngineEvent::Authenticated).await;
        engine.push_event(EngineEvent::Ready).await;

        assert!(matches!(
            engine.next_event().await.unwrap(),
            EngineEvent::Authenticated
        ));
        assert!(matches!(engine.next_event().await.unwrap(), EngineEvent::Ready));
    }

    #[tokio::test]
    async fn next_event_waits_for_injection() {
        let engine = MockEngine::new();
        let engine_clone = Arc::clone(&engine);

        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
            engine_clone.push_event(EngineEvent::Ready).await;
        });

        let event = tokio::time::timeout(
            tokio::time::Duration::from_secs(2),
            engine.next_event(),
        )
        .await
        .expect("next_event timed out")
        .unwrap();
        assert!(matches!(event, EngineEvent::Ready));
    }

    #[tokio::test]
    async fn scripted_init_errors_are_consumed_in_order() {
        let engine = MockEngine::new();
        engine
            .script_init_errors(vec![GroupcastError::engine("boom")])
            .await;

        assert!(engine.initialize().await.is_err());
        assert!(engine.initialize().await.is_ok());
        assert_eq!(engine.init_calls(), 2);
    }

    #[tokio::test]
    async fn injected_send_failure_only_hits_its_target() {
        let engine = MockEngine::new();
        engine.fail_sends_to("b@g.us").await;

        let media = OutgoingMedia {
            path: "x".into(),
            mime_type: "image/png".into(),
            filename: "x.png".into(),
            caption: None,
            as_voice_note: false,
        };
        assert!(engine.send_media(&"b@g.us".into(), media.clone()).await.is_err());
        assert!(engine.send_media(&"c@g.us".into(), media).await.is_ok());
        assert_eq!(engine.sent_media().await.len(), 1);
    }
}
