use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use facetrack_embedding::Embedding;
use facetrack_registry::{IdentityRecord, Matcher, Replica, Snapshot};
use facetrack_sync::RemoteStore;

use crate::EnrollError;

/// Caller's answer when a candidate collides with an existing
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the existing record's embedding, keeping id and name.
    UpdateExisting,
    /// Discard the candidate; nothing is written.
    Cancel,
}

/// Terminal state of one enrollment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A mutation was submitted to the remote store. The local
    /// registry converges once the change event comes back through the
    /// feed; the commit is not synchronously visible to the next
    /// matcher read.
    Committed { id: String, name: String },

    /// No mutation was made.
    Cancelled,
}

/// Caller-side decisions the workflow cannot make on its own.
/// Implemented by the UI layer; the workflow awaits these between
/// steps.
#[async_trait]
pub trait EnrollPrompt: Send + Sync {
    /// The candidate matched `existing` above the duplicate threshold.
    async fn on_duplicate(&self, existing: &IdentityRecord) -> Resolution;

    /// The candidate is new; supply a display name. `None` or a blank
    /// name cancels the enrollment.
    async fn request_name(&self) -> Option<String>;

    /// The supplied name already belongs to `existing` (compared
    /// case-insensitively).
    async fn on_name_collision(&self, existing: &IdentityRecord) -> Resolution;
}

/// Runs duplicate detection and the insert-vs-update decision for
/// candidate embeddings.
///
/// Reads the replica for duplicate checks; writes only through the
/// remote store port.
pub struct Enroller {
    replica: Arc<Replica>,
    matcher: Arc<Matcher>,
    store: Arc<dyn RemoteStore>,
}

impl Enroller {
    pub fn new(replica: Arc<Replica>, matcher: Arc<Matcher>, store: Arc<dyn RemoteStore>) -> Self {
        Self {
            replica,
            matcher,
            store,
        }
    }

    /// Runs the workflow for one candidate embedding.
    pub async fn enroll(
        &self,
        embedding: Embedding,
        prompt: &dyn EnrollPrompt,
    ) -> Result<EnrollOutcome, EnrollError> {
        let snapshot = self.replica.snapshot();

        let duplicate = self.matcher.find_duplicate(&embedding, &snapshot);
        if let Some(existing) = duplicate.identity {
            debug!(id = %existing.id, score = duplicate.score, "enroll: duplicate of existing identity");
            return match prompt.on_duplicate(&existing).await {
                Resolution::UpdateExisting => {
                    self.commit(&existing.id, &existing.name, &embedding).await
                }
                Resolution::Cancel => Ok(EnrollOutcome::Cancelled),
            };
        }

        let name = match prompt.request_name().await {
            Some(name) => name.trim().to_string(),
            None => return Ok(EnrollOutcome::Cancelled),
        };
        if name.is_empty() {
            debug!("enroll: blank name, cancelling");
            return Ok(EnrollOutcome::Cancelled);
        }

        if let Some(existing) = find_by_name(&snapshot, &name) {
            debug!(id = %existing.id, name = %existing.name, "enroll: name collision");
            return match prompt.on_name_collision(&existing).await {
                Resolution::UpdateExisting => {
                    self.commit(&existing.id, &existing.name, &embedding).await
                }
                Resolution::Cancel => Ok(EnrollOutcome::Cancelled),
            };
        }

        let id = Uuid::new_v4().to_string();
        self.commit(&id, &name, &embedding).await
    }

    async fn commit(
        &self,
        id: &str,
        name: &str,
        embedding: &Embedding,
    ) -> Result<EnrollOutcome, EnrollError> {
        self.store.upsert(id, name, embedding).await?;
        info!(%id, %name, "enroll: committed");
        Ok(EnrollOutcome::Committed {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}

fn find_by_name(snapshot: &Snapshot, name: &str) -> Option<Arc<IdentityRecord>> {
    let wanted = name.to_lowercase();
    snapshot
        .iter()
        .find(|r| r.name.to_lowercase() == wanted)
        .cloned()
}
