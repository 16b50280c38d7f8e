use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::record::IdentityRecord;

/// Point-in-time view of the replica.
///
/// Snapshots are copied out under the read lock, so iteration keeps
/// working unchanged while mutations continue. Records iterate in
/// first-insertion order, which makes equal-score match tie-breaking
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<Arc<IdentityRecord>>,
}

impl Snapshot {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<IdentityRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Entry {
    /// Sequence number of the last applied upsert for this id.
    seq: u64,
    /// First-insertion rank, preserved across in-place updates.
    order: u64,
    record: Arc<IdentityRecord>,
}

struct ReplicaInner {
    records: HashMap<String, Entry>,
    /// id -> sequence number of the last applied remove. Blocks
    /// late-arriving upserts from resurrecting a deleted record.
    tombstones: HashMap<String, u64>,
    next_order: u64,
}

/// Local in-memory copy of the enrolled-identity registry.
///
/// The replica is a read-through cache of the remote store, never
/// durable: on process restart it is rebuilt from the store's
/// subscribe-time replay. It is mutated exclusively through
/// [`Replica::apply_upsert`] and [`Replica::apply_remove`]; events carry
/// the store's sequence number and application is last-writer-wins per
/// id, so the final state is the same whatever order events arrive in.
///
/// Thread-safe: mutations are serialized, snapshot reads run
/// concurrently and never observe a partially applied event.
pub struct Replica {
    inner: RwLock<ReplicaInner>,
}

impl Replica {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ReplicaInner {
                records: HashMap::new(),
                tombstones: HashMap::new(),
                next_order: 0,
            }),
        }
    }

    /// Insert or replace the record at `record.id`.
    ///
    /// Returns false when the event is older than the id's last applied
    /// upsert or remove. Applying the same upsert twice leaves the
    /// state unchanged.
    pub fn apply_upsert(&self, seq: u64, record: IdentityRecord) -> bool {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;

        if inner.tombstones.get(&record.id).is_some_and(|&t| t >= seq) {
            debug!(id = %record.id, seq, "dropping upsert older than remove");
            return false;
        }

        if let Some(entry) = inner.records.get_mut(&record.id) {
            if entry.seq > seq {
                debug!(id = %record.id, seq, latest = entry.seq, "dropping stale upsert");
                return false;
            }
            entry.seq = seq;
            entry.record = Arc::new(record);
            return true;
        }

        let order = inner.next_order;
        inner.next_order += 1;
        inner.tombstones.remove(&record.id);
        inner.records.insert(
            record.id.clone(),
            Entry {
                seq,
                order,
                record: Arc::new(record),
            },
        );
        true
    }

    /// Delete the record at `id`.
    ///
    /// Removing an absent id is a no-op, not an error; the tombstone is
    /// still recorded so an older upsert delivered later cannot
    /// resurrect the record. Returns false for a remove older than the
    /// id's current record.
    pub fn apply_remove(&self, seq: u64, id: &str) -> bool {
        let mut inner = self.inner.write().unwrap();

        if let Some(latest) = inner.records.get(id).map(|e| e.seq) {
            if latest > seq {
                debug!(%id, seq, latest, "dropping stale remove");
                return false;
            }
            inner.records.remove(id);
        }

        let tombstone = inner.tombstones.entry(id.to_string()).or_insert(0);
        if seq > *tombstone {
            *tombstone = seq;
        }
        true
    }

    /// Returns an immutable point-in-time view for matching.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read().unwrap();
        let mut entries: Vec<(u64, Arc<IdentityRecord>)> = inner
            .records
            .values()
            .map(|e| (e.order, Arc::clone(&e.record)))
            .collect();
        entries.sort_by_key(|(order, _)| *order);
        Snapshot {
            records: entries.into_iter().map(|(_, r)| r).collect(),
        }
    }

    /// Returns the record at `id`, if present.
    pub fn get(&self, id: &str) -> Option<Arc<IdentityRecord>> {
        let inner = self.inner.read().unwrap();
        inner.records.get(id).map(|e| Arc::clone(&e.record))
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all records, tombstones, and ordering state. Used when a
    /// session re-subscribes and the store replays from scratch.
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.records.clear();
        inner.tombstones.clear();
        inner.next_order = 0;
    }
}

impl Default for Replica {
    fn default() -> Self {
        Self::new()
    }
}
