// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fine-tunes any TextClassifier with periodic evaluation and
// patience-based early stopping.
//
// Per epoch:
//   shuffle the training examples
//   for each batch of batch_size examples:
//       lr ← next value of the cyclic triangular schedule
//       classifier.update(batch, lr)
//       every eval_every steps (never at step 0):
//           evaluate on the eval set inside
//           with_averaged_params, record a CheckpointResult
//       step += 1
//   stop if (step - best.step) / eval_every >= patience
//
// The stop check runs once per epoch, not per step, so a run
// always finishes the epoch it is in. It also means training
// continues for at least patience × eval_every steps past the
// best checkpoint before giving up.
//
// Any error from update() or infer() ends the run; there are
// no retries and nothing is saved from a failed run.

use anyhow::Result;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::checkpoint::{CheckpointHistory, CheckpointResult};
use crate::domain::label::CatDistribution;
use crate::domain::traits::{TextClassifier, TrainingExample};
use crate::infra::metrics::{EvalMetrics, MetricsLogger};
use crate::ml::evaluator::{evaluate, EvalScores};
use crate::ml::schedule::CyclicTriangularRate;

/// Knobs of the training loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub batch_size:       usize,
    pub learn_rate:       f64,
    pub eval_every:       usize,
    pub patience:         usize,
    pub history_capacity: usize,
    pub seed:             u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            batch_size:       24,
            learn_rate:       2e-5,
            eval_every:       100,
            patience:         3,
            history_capacity: 1000,
            seed:             0,
        }
    }
}

/// Held-out texts and their ground truth.
pub struct EvalSet {
    pub texts: Vec<String>,
    pub cats:  Vec<CatDistribution>,
}

impl EvalSet {
    pub fn from_examples(examples: Vec<TrainingExample>) -> Self {
        let (texts, cats) = examples.into_iter().map(|e| (e.text, e.cats)).unzip();
        Self { texts, cats }
    }
}

/// What a finished run looked like.
#[derive(Debug)]
pub struct TrainingReport {
    pub history: CheckpointHistory,
    /// Global step counter when the loop stopped
    pub steps:   usize,
    /// Number of completed epochs
    pub epochs:  usize,
}

pub struct TrainingLoop {
    config: LoopConfig,
}

impl TrainingLoop {
    pub fn new(config: LoopConfig) -> Self {
        Self { config }
    }

    pub fn run<C: TextClassifier>(
        &self,
        classifier: &mut C,
        mut train:  Vec<TrainingExample>,
        eval:       &EvalSet,
        metrics:    Option<&MetricsLogger>,
    ) -> Result<TrainingReport> {
        let cfg        = &self.config;
        let batch_size = cfg.batch_size.max(1);
        let eval_every = cfg.eval_every.max(1);

        anyhow::ensure!(!train.is_empty(), "no training examples");

        let mut rng      = StdRng::seed_from_u64(cfg.seed);
        let mut rates    = CyclicTriangularRate::for_training(cfg.learn_rate, train.len(), batch_size);
        let mut history  = CheckpointHistory::new(cfg.history_capacity);
        let mut epoch    = 0usize;
        let mut step     = 0usize;

        tracing::info!(
            "Training on {} examples: batch_size={}, lr={:e}, eval_every={}, patience={}",
            train.len(),
            batch_size,
            cfg.learn_rate,
            eval_every,
            cfg.patience
        );

        loop {
            // Losses are summed from the start of each epoch
            let mut epoch_loss = 0.0f64;
            train.shuffle(&mut rng);

            for batch in train.chunks(batch_size) {
                let lr = rates.next().unwrap_or(cfg.learn_rate);
                epoch_loss += classifier.update(batch, lr)?;

                if step > 0 && step % eval_every == 0 {
                    let scores = classifier
                        .with_averaged_params(|c| evaluate(c, &eval.texts, &eval.cats))?;
                    history.push(CheckpointResult::new(scores.accuracy, step, epoch));
                    report_eval(epoch_loss, &scores);

                    if let Some(logger) = metrics {
                        logger.log(&EvalMetrics::new(epoch, step, epoch_loss, &scores))?;
                    }
                }
                step += 1;
            }
            epoch += 1;

            if let Some(best) = history.best() {
                let since_best = (step - best.step) / eval_every;
                tracing::debug!(
                    "Epoch {} done at step {}: best {:.3} at step {} ({} eval periods ago)",
                    epoch,
                    step,
                    best.accuracy,
                    best.step,
                    since_best
                );
                if since_best >= cfg.patience {
                    tracing::info!(
                        "No improvement for {} evaluations, stopping at step {}",
                        since_best,
                        step
                    );
                    break;
                }
            }
        }

        Ok(TrainingReport { history, steps: step, epochs: epoch })
    }
}

fn report_eval(loss: f64, scores: &EvalScores) {
    println!(
        "{:.3}\t{:.3}\t{:.3}\t{:.3}",
        loss, scores.accuracy, scores.correct as f64, scores.wrong as f64
    );
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::LabelSet;
    use std::cell::Cell;
    use std::path::Path;

    /// Scripted classifier: the n-th evaluation answers the first
    /// `round(accuracy[n] * len)` texts correctly and the rest wrongly.
    struct ScriptedClassifier {
        labels:     LabelSet,
        accuracies: Vec<f64>,
        evals:      Cell<usize>,
        updates:    usize,
        lrs:        Vec<f64>,
        swaps:      usize,
    }

    impl ScriptedClassifier {
        fn new(accuracies: Vec<f64>) -> Self {
            Self {
                labels: LabelSet::from_labels(["a", "b"]),
                accuracies,
                evals: Cell::new(0),
                updates: 0,
                lrs: Vec::new(),
                swaps: 0,
            }
        }

        fn eval_set(&self, n: usize) -> EvalSet {
            EvalSet {
                texts: (0..n).map(|i| format!("text {i}")).collect(),
                cats:  vec![CatDistribution::one_hot(&self.labels, 0); n],
            }
        }
    }

    impl TextClassifier for ScriptedClassifier {
        fn update(&mut self, _: &[TrainingExample], learn_rate: f64) -> Result<f64> {
            self.updates += 1;
            self.lrs.push(learn_rate);
            Ok(1.0)
        }

        fn infer(&self, texts: &[String]) -> Result<Vec<CatDistribution>> {
            let n   = self.evals.get();
            let acc = *self.accuracies.get(n).or(self.accuracies.last()).unwrap();
            Ok(texts
                .iter()
                .map(|t| {
                    let i: usize = t.trim_start_matches("text ").parse().unwrap();
                    let hit = (i as f64) < (acc * 10.0).round();
                    CatDistribution::one_hot(&self.labels, if hit { 0 } else { 1 })
                })
                .collect())
        }

        fn persist(&self, _: &Path) -> Result<()> {
            Ok(())
        }

        fn with_averaged_params<R>(&mut self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
            self.swaps += 1;
            let out = f(self);
            self.evals.set(self.evals.get() + 1);
            out
        }
    }

    /// One example per epoch so every step is an epoch boundary.
    fn single_batch_train(labels: &LabelSet) -> Vec<TrainingExample> {
        vec![TrainingExample::new("x", CatDistribution::one_hot(labels, 0))]
    }

    #[test]
    fn test_stops_patience_periods_after_peak() {
        // Evaluations happen at steps 100, 200, 300, ...
        let mut clf = ScriptedClassifier::new(vec![0.5, 0.6, 0.8, 0.8]);
        let eval    = clf.eval_set(10);
        let train   = single_batch_train(&clf.labels);
        let config  = LoopConfig { batch_size: 1, ..LoopConfig::default() };

        let report = TrainingLoop::new(config).run(&mut clf, train, &eval, None).unwrap();

        assert_eq!(report.steps, 600);
        assert_eq!(report.epochs, 600);
        assert_eq!(clf.updates, 600);
        assert_eq!(report.history.best().unwrap().step, 300);

        let steps: Vec<usize> = report.history.retained().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![100, 200, 300, 400, 500]);
        // Every evaluation ran inside with_averaged_params
        assert_eq!(clf.swaps, 5);
    }

    #[test]
    fn test_improvement_extends_training() {
        let mut clf = ScriptedClassifier::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.5]);
        let eval    = clf.eval_set(10);
        let train   = single_batch_train(&clf.labels);
        let config  = LoopConfig { batch_size: 1, eval_every: 10, patience: 2, ..LoopConfig::default() };

        let report = TrainingLoop::new(config).run(&mut clf, train, &eval, None).unwrap();

        // Best at step 50 (first 0.5), stop once (step - 50) / 10 >= 2
        assert_eq!(report.history.best().unwrap().step, 50);
        assert_eq!(report.steps, 70);
    }

    #[test]
    fn test_stop_check_waits_for_epoch_end() {
        let mut clf = ScriptedClassifier::new(vec![0.9, 0.1]);
        let eval    = clf.eval_set(10);
        // 25 single-example batches per epoch
        let train: Vec<TrainingExample> = (0..25)
            .map(|i| TrainingExample::new(format!("t{i}"), CatDistribution::one_hot(&clf.labels, 0)))
            .collect();
        let config = LoopConfig { batch_size: 1, eval_every: 10, patience: 1, ..LoopConfig::default() };

        let report = TrainingLoop::new(config).run(&mut clf, train, &eval, None).unwrap();

        // Best at step 10; the first epoch ends at step 25 with (25-10)/10 = 1
        assert_eq!(report.steps, 25);
        assert_eq!(report.epochs, 1);
    }

    #[test]
    fn test_learning_rates_stay_in_cyclic_bounds() {
        let mut clf = ScriptedClassifier::new(vec![0.5]);
        let eval    = clf.eval_set(4);
        let train   = single_batch_train(&clf.labels);
        let config  = LoopConfig { batch_size: 1, eval_every: 5, patience: 1, learn_rate: 0.3, ..LoopConfig::default() };

        TrainingLoop::new(config).run(&mut clf, train, &eval, None).unwrap();

        assert!(!clf.lrs.is_empty());
        for lr in &clf.lrs {
            assert!(*lr >= 0.1 - 1e-12 && *lr <= 0.9 + 1e-12, "lr {lr} out of range");
        }
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let mut clf = ScriptedClassifier::new(vec![0.5]);
        let eval    = clf.eval_set(2);
        let result  = TrainingLoop::new(LoopConfig::default()).run(&mut clf, Vec::new(), &eval, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_eval_set_from_examples() {
        let labels = LabelSet::from_labels(["a", "b"]);
        let set = EvalSet::from_examples(vec![
            TrainingExample::new("one", CatDistribution::one_hot(&labels, 1)),
            TrainingExample::new("two", CatDistribution::one_hot(&labels, 0)),
        ]);
        assert_eq!(set.texts, vec!["one", "two"]);
        assert_eq!(set.cats[0].argmax(), Some("b"));
    }
}
