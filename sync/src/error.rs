use thiserror::Error;

/// Errors returned by remote store and sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The change feed was cancelled or failed. Already-applied replica
    /// state stays readable in a degraded, possibly stale mode.
    #[error("subscription failure: {0}")]
    Subscription(String),

    /// The remote store rejected a mutation. The replica is unchanged
    /// since it only reflects confirmed change events.
    #[error("mutation rejected: {0}")]
    Mutation(String),

    /// A record payload did not decode into an identity record.
    #[error("malformed record {id}: {reason}")]
    Malformed { id: String, reason: String },

    /// The store is closed.
    #[error("store is closed")]
    Closed,
}
