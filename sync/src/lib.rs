//! Synchronization between the local identity registry and the remote
//! record store.
//!
//! The remote store is a multi-writer database reached through the
//! [`RemoteStore`] port; it pushes incremental change notifications
//! over a [`Subscription`] feed. [`SyncAdapter`] owns the subscription
//! lifecycle for a session and translates each notification into an
//! idempotent replica operation. [`MemoryRemote`] is an in-process
//! store implementation for tests and demos.

mod adapter;
mod error;
mod event;
mod memory;
mod store;

pub use adapter::{SyncAdapter, SyncHandle};
pub use error::SyncError;
pub use event::{RemoteEvent, RemoteEventKind, decode_record, encode_record};
pub use memory::MemoryRemote;
pub use store::{RemoteStore, Subscription};
