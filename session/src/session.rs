use std::sync::{Arc, Mutex};

use tracing::info;

use facetrack_embedding::{CosineMetric, Embedding, Metric};
use facetrack_enroll::{EnrollOutcome, EnrollPrompt, Enroller};
use facetrack_pipeline::{Annotation, FaceVision, Frame, FramePipeline};
use facetrack_registry::{MatchResult, Matcher, Replica, Thresholds};
use facetrack_sync::{RemoteStore, SyncAdapter, SyncHandle};

use crate::SessionError;

/// Configures a [`Session`].
pub struct SessionConfig {
    /// Remote record store. Required.
    pub store: Arc<dyn RemoteStore>,

    /// Vision collaborator producing frame embeddings. Required.
    pub vision: Arc<dyn FaceVision>,

    /// Similarity metric. Defaults to cosine.
    pub metric: Option<Arc<dyn Metric>>,

    /// Acceptance thresholds for live matching and enrollment
    /// duplicate detection.
    pub thresholds: Thresholds,
}

/// One attached change feed plus everything that reads through it.
///
/// The replica fills from the store's subscribe-time replay and then
/// follows live changes until [`Session::close`]. Safe for concurrent
/// use: frame processing, identification, and enrollment may run from
/// any task while the feed applies events.
pub struct Session {
    replica: Arc<Replica>,
    matcher: Arc<Matcher>,
    pipeline: FramePipeline,
    enroller: Enroller,
    store: Arc<dyn RemoteStore>,
    sync: Mutex<Option<SyncHandle>>,
}

impl Session {
    /// Subscribes to the store's change feed and returns the running
    /// session.
    pub async fn start(cfg: SessionConfig) -> Result<Self, SessionError> {
        let metric = cfg.metric.unwrap_or_else(|| Arc::new(CosineMetric));
        let replica = Arc::new(Replica::new());
        let matcher = Arc::new(Matcher::new(metric, cfg.thresholds));

        let sync = SyncAdapter::start(Arc::clone(&cfg.store), Arc::clone(&replica)).await?;

        let pipeline = FramePipeline::new(
            Arc::clone(&cfg.vision),
            Arc::clone(&matcher),
            Arc::clone(&replica),
        );
        let enroller = Enroller::new(
            Arc::clone(&replica),
            Arc::clone(&matcher),
            Arc::clone(&cfg.store),
        );

        info!("session started");
        Ok(Self {
            replica,
            matcher,
            pipeline,
            enroller,
            store: cfg.store,
            sync: Mutex::new(Some(sync)),
        })
    }

    /// Identify a query embedding against the current registry state.
    pub fn identify(&self, query: &Embedding) -> MatchResult {
        self.matcher.identify(query, &self.replica.snapshot())
    }

    /// Process one camera frame.
    pub fn process_frame(&self, frame: &Frame) -> Annotation {
        self.pipeline.process(frame)
    }

    /// Run the enrollment workflow for a candidate embedding.
    pub async fn enroll(
        &self,
        embedding: Embedding,
        prompt: &dyn EnrollPrompt,
    ) -> Result<EnrollOutcome, SessionError> {
        Ok(self.enroller.enroll(embedding, prompt).await?)
    }

    /// All enrolled identities as `(id, name)` pairs, in registry
    /// order.
    pub fn list_identities(&self) -> Vec<(String, String)> {
        self.replica
            .snapshot()
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect()
    }

    /// Request deletion of an identity. The registry converges once
    /// the removal event comes back through the feed.
    pub async fn delete_identity(&self, id: &str) -> Result<(), SessionError> {
        self.store.remove(id).await?;
        info!(%id, "delete requested");
        Ok(())
    }

    /// True while the change feed is attached; false after a feed
    /// failure, when matching continues on stale state.
    pub fn is_live(&self) -> bool {
        self.sync
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.is_live())
            .unwrap_or(false)
    }

    /// Detaches the change feed. No registry mutation can occur after
    /// this returns. Idempotent.
    pub async fn close(&self) {
        let handle = self.sync.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.stop().await;
            info!("session closed");
        }
    }
}
