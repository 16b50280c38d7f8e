use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use facetrack_embedding::Embedding;
use facetrack_enroll::{EnrollOutcome, EnrollPrompt, Resolution};
use facetrack_pipeline::{FaceVision, Frame, FrameLabel, VisionError};
use facetrack_registry::{IdentityRecord, Thresholds};
use facetrack_sync::{MemoryRemote, RemoteStore};

use crate::{Session, SessionConfig};

fn emb(values: &[f32]) -> Embedding {
    Embedding::new(values.to_vec()).unwrap()
}

/// Vision stub: the first frame byte selects a basis direction, 0xFF
/// means no face in the frame.
struct StubVision;

impl FaceVision for StubVision {
    fn extract(&self, frame: &Frame) -> Result<Option<Embedding>, VisionError> {
        let Some(&tag) = frame.data.first() else {
            return Ok(None);
        };
        if tag == 0xFF {
            return Ok(None);
        }
        let mut values = vec![0.0f32; 3];
        values[(tag as usize) % 3] = 1.0;
        Ok(Some(Embedding::new(values).unwrap()))
    }

    fn dimension(&self) -> usize {
        3
    }
}

fn frame(tag: u8) -> Frame {
    Frame {
        width: 2,
        height: 2,
        data: vec![tag],
    }
}

struct NamePrompt {
    name: String,
    resolution: Resolution,
}

impl NamePrompt {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            resolution: Resolution::UpdateExisting,
        }
    }
}

#[async_trait]
impl EnrollPrompt for NamePrompt {
    async fn on_duplicate(&self, _existing: &IdentityRecord) -> Resolution {
        self.resolution
    }

    async fn request_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    async fn on_name_collision(&self, _existing: &IdentityRecord) -> Resolution {
        self.resolution
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}

async fn started_session(store: Arc<MemoryRemote>) -> Session {
    Session::start(SessionConfig {
        store,
        vision: Arc::new(StubVision),
        metric: None,
        thresholds: Thresholds::default(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn replays_store_state_then_identifies() {
    let store = Arc::new(MemoryRemote::new());
    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();

    let session = started_session(store).await;
    wait_until(|| session.list_identities().len() == 1).await;

    let result = session.identify(&emb(&[0.99, 0.05, 0.0]));
    assert!(result.matched);
    assert_eq!(result.identity.unwrap().name, "Bob");

    let result = session.identify(&emb(&[0.0, 0.0, 1.0]));
    assert!(!result.matched);

    session.close().await;
}

#[tokio::test]
async fn enrollment_converges_through_the_feed() {
    let store = Arc::new(MemoryRemote::new());
    let session = started_session(store).await;

    let outcome = session
        .enroll(emb(&[0.0, 1.0, 0.0]), &NamePrompt::new("Alice"))
        .await
        .unwrap();
    let EnrollOutcome::Committed { id, name } = outcome else {
        panic!("expected commit");
    };
    assert_eq!(name, "Alice");

    // The commit is not synchronously visible; the replica converges
    // once the change event arrives.
    wait_until(|| session.list_identities().len() == 1).await;
    assert_eq!(session.list_identities()[0], (id, "Alice".to_string()));

    let result = session.identify(&emb(&[0.05, 0.99, 0.0]));
    assert_eq!(result.identity.unwrap().name, "Alice");

    session.close().await;
}

#[tokio::test]
async fn re_enrollment_updates_the_existing_identity() {
    let store = Arc::new(MemoryRemote::new());
    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();

    let session = started_session(store.clone()).await;
    wait_until(|| session.list_identities().len() == 1).await;

    // Nearly identical embedding: duplicate flow, update in place.
    let outcome = session
        .enroll(emb(&[0.99, 0.01, 0.0]), &NamePrompt::new("ignored"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        EnrollOutcome::Committed {
            id: "u1".into(),
            name: "Bob".into()
        }
    );

    wait_until(|| {
        let ids = session.list_identities();
        ids.len() == 1 && ids[0].0 == "u1"
    })
    .await;
    assert_eq!(store.len(), 1);

    session.close().await;
}

#[tokio::test]
async fn delete_identity_flows_back_through_the_feed() {
    let store = Arc::new(MemoryRemote::new());
    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();

    let session = started_session(store).await;
    wait_until(|| session.list_identities().len() == 1).await;

    session.delete_identity("u1").await.unwrap();
    wait_until(|| session.list_identities().is_empty()).await;

    assert!(!session.identify(&emb(&[1.0, 0.0, 0.0])).matched);
    session.close().await;
}

#[tokio::test]
async fn frames_are_annotated_against_live_state() {
    let store = Arc::new(MemoryRemote::new());
    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();

    let session = started_session(store).await;
    wait_until(|| session.list_identities().len() == 1).await;

    // Tag 0 -> basis vector matching Bob.
    let annotation = session.process_frame(&frame(0));
    let Some(FrameLabel::Known { name, .. }) = annotation.label else {
        panic!("expected known label, got {:?}", annotation.label);
    };
    assert_eq!(name, "Bob");

    // Tag 1 -> orthogonal embedding, a stranger.
    let annotation = session.process_frame(&frame(1));
    assert_eq!(annotation.label, Some(FrameLabel::Unknown));

    // 0xFF -> no face in frame.
    let annotation = session.process_frame(&frame(0xFF));
    assert_eq!(annotation.label, None);
}

#[tokio::test]
async fn close_detaches_the_feed() {
    let store = Arc::new(MemoryRemote::new());
    let session = started_session(store.clone()).await;
    assert!(session.is_live());

    session.close().await;
    assert!(!session.is_live());

    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.list_identities().is_empty());

    // Closing again is a no-op.
    session.close().await;
}

#[tokio::test]
async fn feed_failure_leaves_a_stale_but_usable_registry() {
    let store = Arc::new(MemoryRemote::new());
    store
        .upsert("u1", "Bob", &emb(&[1.0, 0.0, 0.0]))
        .await
        .unwrap();

    let session = started_session(store.clone()).await;
    wait_until(|| session.list_identities().len() == 1).await;

    store.fail_subscriptions("outage");
    wait_until(|| !session.is_live()).await;

    // Degraded mode: stale state still answers queries.
    assert!(session.identify(&emb(&[1.0, 0.0, 0.0])).matched);
    session.close().await;
}
