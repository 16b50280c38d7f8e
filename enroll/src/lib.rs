//! Enrollment workflow for new face embeddings.
//!
//! A candidate embedding goes through duplicate detection (strict
//! threshold), then either an update-existing decision or a name
//! request with a case-insensitive collision check, and finally a
//! commit through the remote store port. The local registry is never
//! written directly; it converges once the resulting change event
//! comes back through the sync feed.

mod enroll;
mod error;

pub use enroll::{EnrollOutcome, EnrollPrompt, Enroller, Resolution};
pub use error::EnrollError;
