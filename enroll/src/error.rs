use thiserror::Error;

use facetrack_sync::SyncError;

/// Errors returned by the enrollment workflow.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// The remote store rejected the commit. No mutation happened; the
    /// registry is unchanged.
    #[error("enrollment commit failed: {0}")]
    Mutation(#[from] SyncError),
}
