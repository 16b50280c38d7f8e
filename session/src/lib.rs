//! Process-level entry point for face identification.
//!
//! A [`Session`] wires the registry replica, the remote store's change
//! feed, the matcher, the enrollment workflow, and the frame pipeline
//! together, and owns the subscription lifecycle. The UI layer talks
//! only to this crate.

mod error;
mod session;

pub use error::SessionError;
pub use session::{Session, SessionConfig};

#[cfg(test)]
mod tests;
