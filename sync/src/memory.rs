use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use facetrack_embedding::Embedding;

use crate::event::{RemoteEvent, RemoteEventKind, encode_record};
use crate::store::{RemoteStore, Subscription};
use crate::SyncError;

type FeedSender = mpsc::UnboundedSender<Result<RemoteEvent, SyncError>>;

struct StoredRecord {
    /// Sequence number of the mutation that produced this state.
    seq: u64,
    payload: Value,
}

struct MemoryRemoteInner {
    records: BTreeMap<String, StoredRecord>,
    seq: u64,
    fail_writes: bool,
    subscribers: Vec<FeedSender>,
}

/// In-memory [`RemoteStore`] implementation.
///
/// State is lost on restart; suitable for tests and the demo binary.
/// Honors the feed contract: subscribe-time replay of existing records
/// as `Added` events, then live changes fanned out to every subscriber
/// with a monotone sequence number.
pub struct MemoryRemote {
    inner: Mutex<MemoryRemoteInner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryRemoteInner {
                records: BTreeMap::new(),
                seq: 0,
                fail_writes: false,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the stored payload for `id`, if present.
    pub fn get(&self, id: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(id).map(|r| r.payload.clone())
    }

    /// Makes subsequent upsert/remove calls fail, for exercising
    /// mutation-failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Store an arbitrary payload under `id`, bypassing validation.
    /// Lets tests push malformed records through the feed the way a
    /// buggy foreign writer would.
    pub fn publish_raw(&self, id: &str, payload: Value) {
        let mut inner = self.inner.lock().unwrap();
        Self::store_and_broadcast(&mut inner, id, payload);
    }

    fn store_and_broadcast(inner: &mut MemoryRemoteInner, id: &str, payload: Value) {
        inner.seq += 1;
        let seq = inner.seq;
        let existed = inner
            .records
            .insert(
                id.to_string(),
                StoredRecord {
                    seq,
                    payload: payload.clone(),
                },
            )
            .is_some();
        let kind = if existed {
            RemoteEventKind::Changed {
                id: id.to_string(),
                payload,
            }
        } else {
            RemoteEventKind::Added {
                id: id.to_string(),
                payload,
            }
        };
        Self::broadcast(inner, RemoteEvent { seq, kind });
    }

    /// Fails every live subscription, as a remote feed outage would.
    pub fn fail_subscriptions(&self, reason: &str) {
        let mut inner = self.inner.lock().unwrap();
        for tx in inner.subscribers.drain(..) {
            let _ = tx.send(Err(SyncError::Subscription(reason.to_string())));
        }
    }

    fn broadcast(inner: &mut MemoryRemoteInner, event: RemoteEvent) {
        inner
            .subscribers
            .retain(|tx| tx.send(Ok(event.clone())).is_ok());
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn subscribe(&self) -> Result<Subscription, SyncError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        for (id, record) in &inner.records {
            let event = RemoteEvent {
                seq: record.seq,
                kind: RemoteEventKind::Added {
                    id: id.clone(),
                    payload: record.payload.clone(),
                },
            };
            let _ = tx.send(Ok(event));
        }
        inner.subscribers.push(tx);
        Ok(Subscription::new(rx))
    }

    async fn upsert(&self, id: &str, name: &str, embedding: &Embedding) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(SyncError::Mutation("store rejected write".into()));
        }
        Self::store_and_broadcast(&mut inner, id, encode_record(name, embedding));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(SyncError::Mutation("store rejected write".into()));
        }
        if inner.records.remove(id).is_none() {
            return Ok(());
        }
        inner.seq += 1;
        let seq = inner.seq;
        Self::broadcast(
            &mut inner,
            RemoteEvent {
                seq,
                kind: RemoteEventKind::Removed { id: id.to_string() },
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec()).unwrap()
    }

    async fn collect(sub: &mut Subscription, n: usize) -> Vec<RemoteEvent> {
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            events.push(sub.next().await.unwrap().unwrap());
        }
        events
    }

    #[tokio::test]
    async fn replays_existing_records_on_subscribe() {
        let store = MemoryRemote::new();
        store.upsert("a", "Alice", &emb(&[1.0, 0.0])).await.unwrap();
        store.upsert("b", "Bob", &emb(&[0.0, 1.0])).await.unwrap();

        let mut sub = store.subscribe().await.unwrap();
        let events = collect(&mut sub, 2).await;

        let ids: Vec<&str> = events
            .iter()
            .map(|e| match &e.kind {
                RemoteEventKind::Added { id, .. } => id.as_str(),
                other => panic!("expected Added, got {other:?}"),
            })
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn second_upsert_is_a_change() {
        let store = MemoryRemote::new();
        let mut sub = store.subscribe().await.unwrap();

        store.upsert("a", "Alice", &emb(&[1.0, 0.0])).await.unwrap();
        store.upsert("a", "Alicia", &emb(&[1.0, 0.0])).await.unwrap();

        let events = collect(&mut sub, 2).await;
        assert!(matches!(events[0].kind, RemoteEventKind::Added { .. }));
        assert!(matches!(events[1].kind, RemoteEventKind::Changed { .. }));
        assert!(events[1].seq > events[0].seq);
    }

    #[tokio::test]
    async fn remove_emits_event_only_when_present() {
        let store = MemoryRemote::new();
        let mut sub = store.subscribe().await.unwrap();

        store.remove("ghost").await.unwrap();
        store.upsert("a", "Alice", &emb(&[1.0, 0.0])).await.unwrap();
        store.remove("a").await.unwrap();

        let events = collect(&mut sub, 2).await;
        assert!(matches!(events[0].kind, RemoteEventKind::Added { .. }));
        assert!(matches!(events[1].kind, RemoteEventKind::Removed { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn fail_writes_rejects_mutations() {
        let store = MemoryRemote::new();
        store.set_fail_writes(true);

        let err = store.upsert("a", "Alice", &emb(&[1.0])).await.unwrap_err();
        assert!(matches!(err, SyncError::Mutation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn fail_subscriptions_errors_the_feed() {
        let store = MemoryRemote::new();
        let mut sub = store.subscribe().await.unwrap();

        store.fail_subscriptions("network down");
        let item = sub.next().await.unwrap();
        assert!(matches!(item, Err(SyncError::Subscription(_))));
        // Feed ends after the failure.
        assert!(sub.next().await.is_none());
    }
}
