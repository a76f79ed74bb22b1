// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Measures top-1 accuracy of a classifier on a held-out set.
//
// For every text:
//   1. predict a distribution (micro-batches of 8 texts)
//   2. reduce prediction and ground truth to their argmax
//   3. count a hit when both name the same label
//
// Ties inside a distribution resolve to the first label in
// LabelSet order, the same rule on both sides.
//
// Reference: Rust Book §13 (Iterators)

use anyhow::{bail, Result};

use crate::domain::label::CatDistribution;
use crate::domain::traits::TextClassifier;

/// Texts per inference call during evaluation.
pub const EVAL_BATCH_SIZE: usize = 8;

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalScores {
    /// correct / total, 0.0 for an empty set
    pub accuracy: f64,
    pub correct:  usize,
    pub wrong:    usize,
}

pub fn evaluate<C: TextClassifier>(
    classifier: &C,
    texts:      &[String],
    cats:       &[CatDistribution],
) -> Result<EvalScores> {
    if texts.len() != cats.len() {
        bail!(
            "evaluation set mismatch: {} texts but {} label distributions",
            texts.len(),
            cats.len()
        );
    }

    let mut correct = 0usize;

    for (text_chunk, cat_chunk) in texts
        .chunks(EVAL_BATCH_SIZE)
        .zip(cats.chunks(EVAL_BATCH_SIZE))
    {
        let predicted = classifier.infer(text_chunk)?;
        if predicted.len() != text_chunk.len() {
            bail!(
                "classifier returned {} predictions for {} texts",
                predicted.len(),
                text_chunk.len()
            );
        }

        correct += predicted
            .iter()
            .zip(cat_chunk)
            .filter(|(pred, truth)| {
                let p = pred.argmax();
                p.is_some() && p == truth.argmax()
            })
            .count();
    }

    let total    = texts.len();
    let accuracy = if total > 0 { correct as f64 / total as f64 } else { 0.0 };

    Ok(EvalScores { accuracy, correct, wrong: total - correct })
}
