use std::sync::Arc;

use tracing::debug;

use facetrack_embedding::{Embedding, Metric};

use crate::record::IdentityRecord;
use crate::replica::Snapshot;

/// Minimum similarity scores for accepting a match.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Acceptance threshold for live frame identification.
    pub live: f32,

    /// Acceptance threshold for enrollment duplicate detection.
    /// Must be >= `live`: a face loose enough to identify may still be
    /// distinct enough to enroll.
    pub enroll: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            live: 0.5,
            enroll: 0.8,
        }
    }
}

/// Result of one identification query. Produced fresh per query, never
/// stored.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched: bool,
    pub identity: Option<Arc<IdentityRecord>>,
    pub score: f32,
}

impl MatchResult {
    fn no_match() -> Self {
        Self {
            matched: false,
            identity: None,
            score: 0.0,
        }
    }
}

/// Nearest-match identification over replica snapshots.
///
/// Thread-safe: all methods can be called concurrently.
pub struct Matcher {
    metric: Arc<dyn Metric>,
    thresholds: Thresholds,
}

impl Matcher {
    /// Creates a new Matcher. Panics if `thresholds.enroll` is below
    /// `thresholds.live`.
    pub fn new(metric: Arc<dyn Metric>, thresholds: Thresholds) -> Self {
        assert!(
            thresholds.enroll >= thresholds.live,
            "matcher: enroll threshold must be >= live threshold"
        );
        Self { metric, thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Identify a live frame embedding with the loose threshold.
    pub fn identify(&self, query: &Embedding, snapshot: &Snapshot) -> MatchResult {
        self.best_above(query, snapshot, self.thresholds.live)
    }

    /// Scan for an enrollment duplicate with the strict threshold.
    pub fn find_duplicate(&self, query: &Embedding, snapshot: &Snapshot) -> MatchResult {
        self.best_above(query, snapshot, self.thresholds.enroll)
    }

    /// A candidate wins only when its score strictly exceeds both the
    /// threshold and the best score seen so far, so equal-score ties go
    /// to the earliest record in snapshot order.
    fn best_above(&self, query: &Embedding, snapshot: &Snapshot, threshold: f32) -> MatchResult {
        let mut best: Option<(Arc<IdentityRecord>, f32)> = None;

        for record in snapshot.iter() {
            let score = match self.metric.similarity(query, &record.embedding) {
                Ok(score) => score,
                Err(e) => {
                    debug!(id = %record.id, error = %e, "skipping unscorable record");
                    continue;
                }
            };

            let best_score = best.as_ref().map(|(_, s)| *s).unwrap_or(f32::NEG_INFINITY);
            if score > threshold && score > best_score {
                best = Some((Arc::clone(record), score));
            }
        }

        match best {
            Some((identity, score)) => MatchResult {
                matched: true,
                identity: Some(identity),
                score,
            },
            None => MatchResult::no_match(),
        }
    }
}
