use thiserror::Error;

/// Errors returned by the vision collaborator.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("model error: {0}")]
    Model(String),

    #[error("bad frame: {0}")]
    BadFrame(String),
}
