// ============================================================
// Layer 3 — Checkpoint Results
// ============================================================
// Every evaluation during training produces one
// CheckpointResult: the accuracy reached, the global step it
// was measured at, and the epoch that step belonged to.
//
// CheckpointHistory keeps those results without growing
// forever: a ring of the most recent `capacity` results plus
// the running best. The best is the first result to reach the
// highest accuracy, so a later tie never replaces it.
//
// Results are only ever appended, never mutated.
//
// Reference: Rust Book §8 (Collections), std::collections::VecDeque

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointResult {
    pub accuracy: f64,
    pub step:     usize,
    pub epoch:    usize,
}

impl CheckpointResult {
    pub fn new(accuracy: f64, step: usize, epoch: usize) -> Self {
        Self { accuracy, step, epoch }
    }
}

/// Bounded, append-only record of evaluation results.
#[derive(Debug, Clone)]
pub struct CheckpointHistory {
    capacity: usize,
    recent:   VecDeque<CheckpointResult>,
    best:     Option<CheckpointResult>,
    total:    usize,
}

impl CheckpointHistory {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
            best:   None,
            total:  0,
        }
    }

    pub fn push(&mut self, result: CheckpointResult) {
        // Strictly greater: the first checkpoint to reach a score keeps it
        if self.best.map_or(true, |b| result.accuracy > b.accuracy) {
            self.best = Some(result);
        }
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(result);
        self.total += 1;
    }

    pub fn best(&self) -> Option<&CheckpointResult> {
        self.best.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of results ever pushed, including evicted ones
    pub fn total(&self) -> usize {
        self.total
    }

    /// Retained results in chronological order. The best result is
    /// included even after it has left the recent window.
    pub fn retained(&self) -> Vec<CheckpointResult> {
        let mut out = Vec::with_capacity(self.recent.len() + 1);
        if let Some(best) = self.best {
            let evicted = self
                .recent
                .front()
                .map_or(true, |oldest| best.step < oldest.step);
            if evicted {
                out.push(best);
            }
        }
        out.extend(self.recent.iter().copied());
        out
    }

    /// Retained results sorted by accuracy, highest first. The sort is
    /// stable, so equal accuracies stay in chronological order.
    pub fn ranked(&self) -> Vec<CheckpointResult> {
        let mut ranked = self.retained();
        ranked.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
        ranked
    }
}
