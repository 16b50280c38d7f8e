//! In-memory replica of the enrolled-identity registry and the
//! nearest-match identification engine.
//!
//! The [`Replica`] mirrors a remote multi-writer record store. It is
//! mutated only by applying change events carrying the store's sequence
//! number, which makes it converge to the store's final state no matter
//! the delivery order. [`Matcher`] scans replica snapshots for the best
//! scoring identity above a configurable threshold; live frame
//! identification and enrollment duplicate detection use two different
//! thresholds.

mod matcher;
mod record;
mod replica;

pub use matcher::{MatchResult, Matcher, Thresholds};
pub use record::IdentityRecord;
pub use replica::{Replica, Snapshot};
