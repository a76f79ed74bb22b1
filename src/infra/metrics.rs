// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per evaluation and renders the final
// leaderboard of checkpoints.
//
// Metrics recorded per evaluation:
//   - epoch:    epoch the evaluation happened in (0-based)
//   - step:     global step counter
//   - loss:     training loss summed since the epoch started
//   - accuracy: top-1 accuracy on the eval partition
//   - correct / wrong: raw counts behind the accuracy
//
// Output file: <output_dir>/metrics.csv
//
// Example CSV output:
//   epoch,step,loss,accuracy,correct,wrong
//   0,100,41.203311,0.512000,64,61
//   1,200,17.880417,0.688000,86,39
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use crate::domain::checkpoint::CheckpointResult;
use crate::ml::evaluator::EvalScores;

/// Rows shown by the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// One row of the metrics CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub epoch:    usize,
    pub step:     usize,
    pub loss:     f64,
    pub accuracy: f64,
    pub correct:  usize,
    pub wrong:    usize,
}

impl EvalMetrics {
    pub fn new(epoch: usize, step: usize, loss: f64, scores: &EvalScores) -> Self {
        Self {
            epoch,
            step,
            loss,
            accuracy: scores.accuracy,
            correct:  scores.correct,
            wrong:    scores.wrong,
        }
    }
}

/// Appends evaluation metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and start a fresh CSV with a header row.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writer.write_record(["epoch", "step", "loss", "accuracy", "correct", "wrong"])?;
        writer.flush()?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, m: &EvalMetrics) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&[
            m.epoch.to_string(),
            m.step.to_string(),
            format!("{:.6}", m.loss),
            format!("{:.6}", m.accuracy),
            m.correct.to_string(),
            m.wrong.to_string(),
        ])?;
        writer.flush()?;

        tracing::debug!("Logged step {} metrics: accuracy={:.4}", m.step, m.accuracy);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Table of the best checkpoints, highest accuracy first.
///
/// `ranked` must already be sorted; only the first
/// [`LEADERBOARD_SIZE`] rows are rendered.
pub fn render_leaderboard(ranked: &[CheckpointResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Best scoring checkpoints");
    let _ = writeln!(out, "{:>6}  {:>8}  {:>6}", "Epoch", "Step", "Score");
    let _ = writeln!(out, "{:>6}  {:>8}  {:>6}", "-----", "----", "-----");
    for r in ranked.iter().take(LEADERBOARD_SIZE) {
        let _ = writeln!(out, "{:>6}  {:>8}  {:>6.2}", r.epoch, r.step, r.accuracy * 100.0);
    }
    out
}
