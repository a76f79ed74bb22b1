// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Typed failures for the data, configuration and framework
// seams. Callers receive them wrapped in anyhow::Error and can
// downcast when the variant matters.

use thiserror::Error;

/// Failures raised while preparing or running a fine-tuning run.
///
/// None of these are caught or retried anywhere; they travel up
/// through `anyhow` and end the process with a nonzero exit code.
#[derive(Error, Debug)]
pub enum FinetuneError {
    /// `articles.csv` is missing, unreadable, or yielded no rows
    #[error("input data error: {0}")]
    InputData(String),

    /// A label has too few members to appear on both sides of a split
    #[error(
        "label '{label}' has {count} member(s) in the {stage} split; \
         at least 2 are needed for a stratified split"
    )]
    Stratification {
        label: String,
        count: usize,
        stage: &'static str,
    },

    /// A record's label was not seen in the training partition
    #[error("label '{0}' is not part of the training label set")]
    UnknownLabel(String),

    /// A run setting that cannot work, rejected before any file is written
    #[error("configuration error: {0}")]
    Config(String),

    /// Tokenizer, backend, or recorder failure
    #[error("framework error: {0}")]
    Framework(String),
}
