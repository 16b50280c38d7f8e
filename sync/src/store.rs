use async_trait::async_trait;
use tokio::sync::mpsc;

use facetrack_embedding::Embedding;

use crate::event::RemoteEvent;
use crate::SyncError;

/// An open change feed. Dropping the subscription detaches it from the
/// store.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Result<RemoteEvent, SyncError>>,
}

impl Subscription {
    /// Wraps a raw event channel.
    pub fn new(rx: mpsc::UnboundedReceiver<Result<RemoteEvent, SyncError>>) -> Self {
        Self { rx }
    }

    /// Next feed item. `None` means the feed ended.
    pub async fn next(&mut self) -> Option<Result<RemoteEvent, SyncError>> {
        self.rx.recv().await
    }
}

/// The remote identity record store.
///
/// The store owns persistence, offline caching, and reconnection; this
/// core only consumes its change feed and issues mutations. Mutation
/// results are asynchronous and never awaited from the per-frame path;
/// the registry converges when the resulting change event comes back
/// through the feed.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Open the change feed. Current store state is replayed as
    /// [`crate::RemoteEventKind::Added`] events before live changes.
    async fn subscribe(&self) -> Result<Subscription, SyncError>;

    /// Insert or replace the record at `id`.
    async fn upsert(&self, id: &str, name: &str, embedding: &Embedding) -> Result<(), SyncError>;

    /// Delete the record at `id`. Unknown ids are not an error.
    async fn remove(&self, id: &str) -> Result<(), SyncError>;
}
