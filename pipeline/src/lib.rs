//! Per-frame identification pipeline.
//!
//! Each delivered camera frame is handed to the external vision
//! collaborator for embedding extraction, matched against the current
//! registry snapshot with the loose live threshold, and annotated with
//! the identified name (or an unknown marker) plus the measured
//! processing time. Frames without a face and an empty registry
//! short-circuit to no annotation.

mod driver;
mod error;
mod vision;

pub use driver::{Annotation, FrameLabel, FramePipeline};
pub use error::VisionError;
pub use vision::{FaceVision, Frame};
