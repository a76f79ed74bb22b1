// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// All flags of the fine-tuning command.
//
// Long flags keep their underscore spelling (--batch_size).
// clap short flags are a single character, so the two-letter
// shorthands are long aliases instead: --bs, --lr.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use crate::application::train_use_case::TrainConfig;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Base model directory (tokenizer.json, config.json, encoder.mpk are
    /// picked up when present)
    pub model: String,

    /// Where to save the fine-tuned model; nothing is saved when omitted
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: Option<String>,

    /// Examples per update
    #[arg(short = 'b', long = "batch_size", visible_alias = "bs", default_value_t = 24)]
    pub batch_size: usize,

    /// Base learning rate; the schedule cycles between lr/3 and lr*3
    #[arg(short = 'l', long = "learn_rate", visible_alias = "lr", default_value_t = 2e-5)]
    pub learn_rate: f64,

    /// Number of epochs (accepted but unused: early stopping ends training)
    #[arg(short = 'n', long = "n_iter", default_value_t = 4)]
    pub n_iter: usize,

    /// Train on individual sentences instead of whole articles
    #[arg(short = 's', long = "sentence_split")]
    pub sentence_split: bool,

    /// Normalise texts (tag escaping, whitespace, accents) before training
    #[arg(long)]
    pub preprocess: bool,

    /// Steps between evaluations
    #[arg(long = "eval_every", default_value_t = 100)]
    pub eval_every: usize,

    /// Evaluation periods without improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Seed for the split and the per-epoch shuffle
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Maximum tokens per text, including [CLS]
    #[arg(long = "max_seq_len", default_value_t = 256)]
    pub max_seq_len: usize,

    /// Hidden dimension of the encoder
    #[arg(long = "d_model", default_value_t = 256)]
    pub d_model: usize,

    /// Attention heads; must divide d_model
    #[arg(long = "num_heads", default_value_t = 8)]
    pub num_heads: usize,

    /// Stacked encoder blocks
    #[arg(long = "num_layers", default_value_t = 4)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long = "d_ff", default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Size of the token embedding table
    #[arg(long = "vocab_size", default_value_t = 30000)]
    pub vocab_size: usize,
}

/// Layer 1 → Layer 2 boundary: the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            model:          a.model,
            output_dir:     a.output_dir,
            batch_size:     a.batch_size,
            learn_rate:     a.learn_rate,
            n_iter:         a.n_iter,
            sentence_split: a.sentence_split,
            preprocess:     a.preprocess,
            eval_every:     a.eval_every,
            patience:       a.patience,
            seed:           a.seed,
            max_seq_len:    a.max_seq_len,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
            ..TrainConfig::default()
        }
    }
}
