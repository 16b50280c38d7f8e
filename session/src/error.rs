use thiserror::Error;

use facetrack_enroll::EnrollError;
use facetrack_sync::SyncError;

/// Errors surfaced by the session facade.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Enroll(#[from] EnrollError),
}
