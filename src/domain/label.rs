// ============================================================
// Layer 3 — LabelSet and CatDistribution
// ============================================================
// LabelSet is the ordered set of unique labels observed in the
// training partition. It is computed once, before training,
// and fixes the dimensionality of every distribution after it.
//
// CatDistribution maps every label in the set to a score:
//   - ground truth: exactly one 1.0, every other label 0.0
//   - predictions:  softmax probabilities on the simplex
//
// It is dense: all k labels are always present as keys, even
// at 0.0. Entries keep LabelSet order, which makes argmax
// deterministic: ties go to the first entry.
//
// Reference: Rust Book §8 (Collections)

use serde::{Deserialize, Serialize};

/// Unique labels in first-encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Collect unique labels, keeping the order they first appear in.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = Vec::<String>::new();
        for label in labels {
            if !seen.iter().any(|l| l == label) {
                seen.push(label.to_string());
            }
        }
        Self { labels: seen }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index_of(label).is_some()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

/// Dense label → score mapping over a LabelSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatDistribution {
    entries: Vec<(String, f32)>,
}

impl CatDistribution {
    /// Pair every label with its score. `scores` must be parallel to `labels`.
    pub fn from_scores(labels: &LabelSet, scores: &[f32]) -> Self {
        debug_assert_eq!(labels.len(), scores.len());
        let entries = labels
            .iter()
            .zip(scores.iter().copied())
            .map(|(l, s)| (l.to_string(), s))
            .collect();
        Self { entries }
    }

    /// 1.0 at `index`, 0.0 elsewhere.
    pub fn one_hot(labels: &LabelSet, index: usize) -> Self {
        let entries = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.to_string(), if i == index { 1.0 } else { 0.0 }))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(l, s)| (l.as_str(), *s))
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, s)| s).sum()
    }

    /// Position of the highest score. Ties resolve to the earliest entry.
    pub fn argmax_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, (_, score)) in self.entries.iter().enumerate() {
            match best {
                Some((_, b)) if *score <= b => {}
                _ => best = Some((i, *score)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Label with the highest score. Ties resolve to the earliest entry.
    pub fn argmax(&self) -> Option<&str> {
        self.argmax_index().map(|i| self.entries[i].0.as_str())
    }
}
