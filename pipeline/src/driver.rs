use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use facetrack_registry::{Matcher, Replica};

use crate::vision::{FaceVision, Frame};

/// Label painted next to the detected face.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameLabel {
    /// The face matched an enrolled identity.
    Known { name: String, score: f32 },

    /// A face was found but nobody in the registry matched.
    Unknown,
}

/// Outcome of processing one frame.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// `None` when no face was found or the registry is empty.
    pub label: Option<FrameLabel>,

    /// Wall-clock processing time for this frame.
    pub elapsed: Duration,
}

/// Timer-driven per-frame loop: extract an embedding, match it against
/// a fresh registry snapshot, produce an annotation.
///
/// Never blocks on the network; remote synchronization happens on its
/// own task and only shows up here through the snapshots.
pub struct FramePipeline {
    vision: Arc<dyn FaceVision>,
    matcher: Arc<Matcher>,
    replica: Arc<Replica>,
}

impl FramePipeline {
    pub fn new(vision: Arc<dyn FaceVision>, matcher: Arc<Matcher>, replica: Arc<Replica>) -> Self {
        Self {
            vision,
            matcher,
            replica,
        }
    }

    /// Processes one delivered frame.
    pub fn process(&self, frame: &Frame) -> Annotation {
        let start = Instant::now();
        let label = self.label_frame(frame);
        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, "frame processed");
        Annotation { label, elapsed }
    }

    fn label_frame(&self, frame: &Frame) -> Option<FrameLabel> {
        let query = match self.vision.extract(frame) {
            Ok(Some(embedding)) => embedding,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "vision: extraction failed, skipping frame");
                return None;
            }
        };

        let snapshot = self.replica.snapshot();
        if snapshot.is_empty() {
            return None;
        }

        let result = self.matcher.identify(&query, &snapshot);
        match result.identity {
            Some(identity) => Some(FrameLabel::Known {
                name: identity.name.clone(),
                score: result.score,
            }),
            None => Some(FrameLabel::Unknown),
        }
    }
}
