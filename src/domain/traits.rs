// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, never
// against the loaders or the Burn model directly:
//
//   RecordSource   — where labelled articles come from
//   TextClassifier — the fine-tunable model, reduced to the
//                    three operations the training loop needs
//
// The transformer, the optimiser, and the batched inference
// engine all live behind TextClassifier. The training loop
// and the evaluator never see a tensor.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::Path;

use crate::domain::label::CatDistribution;
use crate::domain::record::Record;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the raw labelled dataset.
///
/// Implementations:
///   - CsvLoader → reads `articles.csv`
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<Record>>;
}

// ─── TrainingExample ──────────────────────────────────────────────────────────
/// A text paired with its ground-truth label distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub text: String,
    pub cats: CatDistribution,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, cats: CatDistribution) -> Self {
        Self { text: text.into(), cats }
    }
}

// ─── TextClassifier ───────────────────────────────────────────────────────────
/// A text classifier that can be fine-tuned one batch at a time.
///
/// Implementations:
///   - BurnClassifier → transformer encoder + softmax head
///   - test fakes     → scripted predictions for loop tests
pub trait TextClassifier {
    /// Apply one optimiser step on `batch` at `learn_rate`.
    /// Returns the batch loss.
    fn update(&mut self, batch: &[TrainingExample], learn_rate: f64) -> Result<f64>;

    /// Predict one distribution per text, in input order.
    fn infer(&self, texts: &[String]) -> Result<Vec<CatDistribution>>;

    /// Write everything needed to reload the classifier into `dir`.
    fn persist(&self, dir: &Path) -> Result<()>;

    /// Run `f` with the parameters meant for evaluation swapped in,
    /// restoring the live parameters afterwards. Classifiers that
    /// keep no separate evaluation parameters just call `f`.
    ///
    /// `BurnClassifier` keeps no averaged copy and uses this default,
    /// so its evaluations see the current weights with dropout off.
    fn with_averaged_params<R>(&mut self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R>
    where
        Self: Sized,
    {
        f(self)
    }
}
