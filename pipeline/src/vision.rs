use facetrack_embedding::Embedding;

use crate::VisionError;

/// One captured camera frame.
///
/// The pixel layout is whatever the configured vision model expects;
/// this core never inspects it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Locates the dominant face in a frame and produces its embedding.
///
/// Implemented outside this core by the native vision pipeline;
/// `Ok(None)` means no face was found in the frame.
///
/// Implementations must be safe for concurrent use.
pub trait FaceVision: Send + Sync {
    /// Extracts the embedding of the dominant face, if any.
    fn extract(&self, frame: &Frame) -> Result<Option<Embedding>, VisionError>;

    /// Dimensionality of produced embeddings.
    fn dimension(&self) -> usize;
}
