// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the delivery pipeline: failure isolation between
//! targets, the forward fallback, and transient artifact hygiene.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use groupcast_config::model::RelayConfig;
use groupcast_core::types::{InboundMessage, MediaKind, MediaPayload};
use groupcast_core::{EventSink, MessagingEngine};
use groupcast_relay::DeliveryPipeline;
use groupcast_routing::{RoutingRule, RoutingTable};
use groupcast_test_utils::{MockEngine, MockSink};

fn image_message(id: &str, chat_id: &str) -> InboundMessage {
    InboundMessage {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        is_group: true,
        kind: MediaKind::Image,
        mime_type: Some("image/jpeg".to_string()),
        body: String::new(),
        has_media: true,
    }
}

fn png_payload() -> MediaPayload {
    MediaPayload {
        bytes: vec![0x89, b'P', b'N', b'G'],
        mime_type: "image/png".to_string(),
    }
}

struct Fixture {
    engine: Arc<MockEngine>,
    sink: Arc<MockSink>,
    pipeline: DeliveryPipeline,
    _dir: tempfile::TempDir,
}

fn fixture(rules: Vec<RoutingRule>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let engine = MockEngine::new();
    let sink = Arc::new(MockSink::new());
    let mut table = RoutingTable::default();
    for rule in rules {
        table.add(rule);
    }
    let config = RelayConfig {
        storage_root: dir.path().to_string_lossy().into_owned(),
        cleanup_grace_secs: 30,
    };
    let pipeline = DeliveryPipeline::new(
        Arc::clone(&engine) as Arc<dyn MessagingEngine>,
        Arc::clone(&sink) as Arc<dyn EventSink>,
        Arc::new(RwLock::new(table)),
        &config,
    );
    Fixture {
        engine,
        sink,
        pipeline,
        _dir: dir,
    }
}

fn rule(source: &str, targets: &[&str]) -> RoutingRule {
    RoutingRule {
        source: source.into(),
        targets: targets.iter().map(|t| (*t).into()).collect(),
        kinds: None,
    }
}

#[tokio::test]
async fn one_failing_target_does_not_block_the_others() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us", "c@g.us"])]);
    f.engine.set_payload("m1", png_payload()).await;
    f.engine.fail_sends_to("b@g.us").await;
    f.engine.fail_forwards_to("b@g.us").await;

    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    // b failed both stages, c still got the native re-upload.
    let sent = f.engine.sent_media().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0 .0, "c@g.us");
    assert_eq!(sent[0].1.mime_type, "image/png");
    assert!(f
        .sink
        .logs()
        .iter()
        .any(|l| l.contains("forward") && l.contains("b@g.us") && l.contains("failed")));
}

#[tokio::test]
async fn empty_payload_falls_back_to_forward() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.engine
        .set_payload(
            "m1",
            MediaPayload {
                bytes: Vec::new(),
                mime_type: "image/jpeg".to_string(),
            },
        )
        .await;

    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    assert!(f.engine.sent_media().await.is_empty());
    let forwards = f.engine.forwards().await;
    assert_eq!(forwards.len(), 1);
    assert_eq!(forwards[0].0, "m1");
    assert_eq!(forwards[0].1 .0, "b@g.us");
}

#[tokio::test]
async fn missing_payload_falls_back_to_forward() {
    // No payload registered for the id at all.
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    assert!(f.engine.sent_media().await.is_empty());
    assert_eq!(f.engine.forwards().await.len(), 1);
}

#[tokio::test]
async fn source_listed_as_target_is_skipped() {
    let f = fixture(vec![rule("a@g.us", &["a@g.us", "b@g.us"])]);
    f.engine.set_payload("m1", png_payload()).await;

    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    let sent = f.engine.sent_media().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0 .0, "b@g.us");
}

#[tokio::test]
async fn non_media_message_in_matched_source_is_skipped_with_notice() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    let msg = InboundMessage {
        id: "m1".to_string(),
        chat_id: "a@g.us".to_string(),
        is_group: true,
        kind: MediaKind::Text,
        mime_type: None,
        body: "hello".to_string(),
        has_media: false,
    };

    f.pipeline.handle_message(msg).await;

    assert!(f.engine.sent_media().await.is_empty());
    assert!(f.engine.forwards().await.is_empty());
    assert!(f.sink.logs().iter().any(|l| l.contains("skipping text")));
}

#[tokio::test]
async fn unmatched_source_is_silent() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.pipeline
        .handle_message(image_message("m1", "other@g.us"))
        .await;

    assert!(f.engine.sent_media().await.is_empty());
    assert!(f.engine.forwards().await.is_empty());
    assert!(f.sink.logs().is_empty());
}

#[tokio::test]
async fn kind_filter_excludes_non_listed_kinds() {
    let f = fixture(vec![RoutingRule {
        source: "a@g.us".into(),
        targets: vec!["b@g.us".into()],
        kinds: Some(vec![MediaKind::Video]),
    }]);
    f.engine.set_payload("m1", png_payload()).await;

    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    assert!(f.engine.sent_media().await.is_empty());
    assert!(f.engine.forwards().await.is_empty());
}

#[tokio::test]
async fn document_with_image_mime_is_relayed() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.engine.set_payload("m1", png_payload()).await;
    let msg = InboundMessage {
        id: "m1".to_string(),
        chat_id: "a@g.us".to_string(),
        is_group: true,
        kind: MediaKind::Document,
        mime_type: Some("image/png".to_string()),
        body: String::new(),
        has_media: true,
    };

    f.pipeline.handle_message(msg).await;
    assert_eq!(f.engine.sent_media().await.len(), 1);
}

#[tokio::test]
async fn caption_and_observed_mime_are_forced_onto_the_upload() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.engine
        .set_payload(
            "m1",
            MediaPayload {
                bytes: vec![1, 2, 3],
                mime_type: "video/mp4; codecs=avc1".to_string(),
            },
        )
        .await;
    let msg = InboundMessage {
        id: "m1".to_string(),
        chat_id: "a@g.us".to_string(),
        is_group: true,
        kind: MediaKind::Video,
        mime_type: Some("video/mp4; codecs=avc1".to_string()),
        body: "look at this".to_string(),
        has_media: true,
    };

    f.pipeline.handle_message(msg).await;

    let sent = f.engine.sent_media().await;
    assert_eq!(sent.len(), 1);
    let media = &sent[0].1;
    assert_eq!(media.mime_type, "video/mp4; codecs=avc1");
    assert_eq!(media.caption.as_deref(), Some("look at this"));
    assert!(media.filename.ends_with(".mp4"));
    assert!(!media.as_voice_note);
}

#[tokio::test(start_paused = true)]
async fn artifact_is_deleted_after_the_grace_period() {
    let f = fixture(vec![rule("a@g.us", &["b@g.us"])]);
    f.engine.set_payload("m1", png_payload()).await;

    f.pipeline.handle_message(image_message("m1", "a@g.us")).await;

    let sent = f.engine.sent_media().await;
    assert_eq!(sent.len(), 1);
    let path = sent[0].1.path.clone();
    assert!(path.exists());

    tokio::time::sleep(Duration::from_secs(31)).await;
    // The deletion runs on the blocking fs pool; give it a moment.
    for _ in 0..100 {
        if !path.exists() {
            break;
        }
        tokio::task::yield_now().await;
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!path.exists());
}
