// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full fine-tuning pipeline in order:
//
//   Step 1: Load articles.csv                 (Layer 4 - data)
//   Step 2: Stratified train/test/dev split   (Layer 4 - data)
//   Step 3: Export partitions + labels        (Layer 4 - data)
//   Step 4: Vectorise train and test          (Layer 4 - data)
//   Step 5: Optional cleanup / sentence split (Layer 4 - data)
//   Step 6: Tokenizer and base model          (Layer 6 - infra)
//   Step 7: Run training loop                 (Layer 5 - ml)
//   Step 8: Leaderboard and persistence       (Layer 6 - infra)
//
// The test partition is the evaluation set during training.
// The dev partition is only exported.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::errors::FinetuneError;
use crate::data::{
    exporter::PartitionExporter,
    loader::CsvLoader,
    preprocessor::Preprocessor,
    sentencizer::Sentencizer,
    splitter::DatasetSplitter,
    vectorizer::LabelVectorizer,
};
use crate::domain::label::LabelSet;
use crate::domain::traits::{RecordSource, TextClassifier, TrainingExample};
use crate::infra::{
    metrics::{render_leaderboard, MetricsLogger},
    model_store::ModelStore,
    tokenizer_store::{TokenizerStore, FIRST_WORD_ID},
};
use crate::ml::{
    classifier::{BurnClassifier, TrainBackend},
    model::TextClassifierConfig,
    trainer::{EvalSet, LoopConfig, TrainingLoop, TrainingReport},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Saved as train_config.json next to a
// persisted model so the run can be reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Holds articles.csv; partitions are written here too
    pub data_dir:         String,
    /// Base model directory (tokenizer.json, config.json, encoder.mpk)
    pub model:            String,
    pub output_dir:       Option<String>,
    pub batch_size:       usize,
    pub learn_rate:       f64,
    /// Accepted for compatibility; training length is set by early stopping
    pub n_iter:           usize,
    pub sentence_split:   bool,
    pub preprocess:       bool,
    pub eval_every:       usize,
    pub patience:         usize,
    pub history_capacity: usize,
    pub seed:             u64,
    pub max_seq_len:      usize,
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub dropout:          f64,
    pub vocab_size:       usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:         "data".to_string(),
            model:            "model".to_string(),
            output_dir:       None,
            batch_size:       24,
            learn_rate:       2e-5,
            n_iter:           4,
            sentence_split:   false,
            preprocess:       false,
            eval_every:       100,
            patience:         3,
            history_capacity: 1000,
            seed:             0,
            max_seq_len:      256,
            d_model:          256,
            num_heads:        8,
            num_layers:       4,
            d_ff:             1024,
            dropout:          0.1,
            vocab_size:       30000,
        }
    }
}

impl TrainConfig {
    /// Reject settings no run can succeed with.
    pub fn validate(&self) -> Result<(), FinetuneError> {
        if self.vocab_size <= FIRST_WORD_ID {
            return Err(FinetuneError::Config(format!(
                "vocab_size must be greater than {FIRST_WORD_ID} to leave room for words, got {}",
                self.vocab_size
            )));
        }
        Ok(())
    }

    /// Architecture from the command line; `num_labels` is filled in
    /// once the label set is known.
    pub fn model_config(&self) -> TextClassifierConfig {
        TextClassifierConfig::new(
            self.vocab_size, self.max_seq_len, self.d_model,
            self.num_heads, self.num_layers, self.d_ff, self.dropout, 0,
        )
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            batch_size:       self.batch_size,
            learn_rate:       self.learn_rate,
            eval_every:       self.eval_every,
            patience:         self.patience,
            history_capacity: self.history_capacity,
            seed:             self.seed,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run on the default Wgpu device.
    pub fn execute(&self) -> Result<TrainingReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.run::<TrainBackend>(device)
    }

    pub fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainingReport> {
        let cfg      = &self.config;
        let data_dir = PathBuf::from(&cfg.data_dir);
        cfg.validate()?;

        tracing::info!(
            "n_iter={} is recorded but not used; early stopping ends training",
            cfg.n_iter
        );

        // ── Step 1: Load the labelled articles ────────────────────────────────
        let loader  = CsvLoader::new(data_dir.join("articles.csv"));
        let records = loader.load_all()?;
        tracing::info!("Loaded {} records from '{}'", records.len(), loader.path().display());

        // ── Step 2: Stratified split ──────────────────────────────────────────
        let split = DatasetSplitter::new(cfg.seed).split(records)?;

        // ── Step 3: Export partitions and the label set ───────────────────────
        let exporter = PartitionExporter::new(&data_dir);
        for partition in split.partitions() {
            exporter.export(partition)?;
        }
        let labels = LabelSet::from_labels(split.train.labels());
        exporter.export_labels(&labels)?;
        tracing::info!("Labels ({}): {:?}", labels.len(), labels.as_slice());

        // ── Step 4: Vectorise ─────────────────────────────────────────────────
        let vectorizer = LabelVectorizer::new(&labels);
        let mut train  = vectorizer.examples(&split.train.records)?;
        let mut eval   = vectorizer.examples(&split.test.records)?;

        // ── Step 5: Optional cleanup and sentence splitting ───────────────────
        if cfg.preprocess {
            let preprocessor = Preprocessor::new();
            clean_all(&preprocessor, &mut train)?;
            clean_all(&preprocessor, &mut eval)?;
        }
        if cfg.sentence_split {
            let before = train.len();
            train = Sentencizer::new().explode(train);
            tracing::info!("Sentence split: {} articles → {} examples", before, train.len());
        }

        // ── Step 6: Tokenizer and base model ──────────────────────────────────
        let base = ModelStore::new(&cfg.model);
        if !base.dir().exists() {
            tracing::warn!(
                "Base model directory '{}' not found, starting from scratch",
                cfg.model
            );
        }
        let corpus: Vec<String> = train.iter().map(|ex| ex.text.clone()).collect();
        let tokenizer = TokenizerStore::new(&cfg.model).load_or_build(&corpus, cfg.vocab_size)?;

        let architecture = match base.load_config()? {
            Some(saved) => {
                tracing::info!("Using architecture from '{}'", cfg.model);
                saved
            }
            None => cfg.model_config(),
        };
        let mut classifier =
            BurnClassifier::<B>::new(architecture, labels, tokenizer, device)?;
        if base.has_encoder() {
            classifier = classifier.with_base_encoder(&base)?;
        }

        let output  = cfg.output_dir.as_ref().map(PathBuf::from);
        let metrics = match &output {
            Some(dir) => {
                ModelStore::new(dir).save_train_config(cfg)?;
                Some(MetricsLogger::new(dir)?)
            }
            None => None,
        };

        // ── Step 7: Train ─────────────────────────────────────────────────────
        let eval_set = EvalSet::from_examples(eval);
        let report   = TrainingLoop::new(cfg.loop_config())
            .run(&mut classifier, train, &eval_set, metrics.as_ref())
            .context("Training failed")?;

        // ── Step 8: Report and persist ────────────────────────────────────────
        print!("{}", render_leaderboard(&report.history.ranked()));
        if let Some(best) = report.history.best() {
            tracing::info!(
                "Best accuracy {:.4} at step {} (epoch {}), {} evaluations",
                best.accuracy,
                best.step,
                best.epoch,
                report.history.total()
            );
        }

        if let Some(dir) = &output {
            persist(&classifier, dir)?;
        }
        Ok(report)
    }
}

fn clean_all(preprocessor: &Preprocessor, examples: &mut [TrainingExample]) -> Result<()> {
    for example in examples.iter_mut() {
        example.text = preprocessor.clean(&example.text)?;
    }
    Ok(())
}

fn persist<C: TextClassifier>(classifier: &C, dir: &Path) -> Result<()> {
    classifier
        .persist(dir)
        .with_context(|| format!("Cannot save model to '{}'", dir.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::exporter::read_json;
    use std::fs;

    type B = burn::backend::Autodiff<burn::backend::NdArray>;

    const LABELS: [&str; 3] = ["Etat", "Sport", "Web"];

    fn write_articles(dir: &Path) {
        let words = [
            ["budget", "regierung", "minister", "steuer", "haushalt"],
            ["tor", "spiel", "trainer", "liga", "meister"],
            ["internet", "app", "software", "daten", "netz"],
        ];
        let mut csv = String::new();
        for (label, vocab) in LABELS.iter().zip(words) {
            for i in 0..5 {
                csv.push_str(&format!(
                    "{label};{} und {}. Mehr {}!\n",
                    vocab[i],
                    vocab[(i + 1) % 5],
                    vocab[(i + 2) % 5]
                ));
            }
        }
        // Malformed row, skipped by the loader
        csv.push_str("kaputt\n");
        fs::write(dir.join("articles.csv"), csv).unwrap();
    }

    fn tiny_config(data_dir: &Path, model: &Path, output: Option<&Path>) -> TrainConfig {
        TrainConfig {
            data_dir:    data_dir.display().to_string(),
            model:       model.display().to_string(),
            output_dir:  output.map(|p| p.display().to_string()),
            batch_size:  4,
            learn_rate:  1e-3,
            eval_every:  2,
            patience:    1,
            max_seq_len: 16,
            d_model:     8,
            num_heads:   2,
            num_layers:  1,
            d_ff:        16,
            dropout:     0.0,
            vocab_size:  200,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_full_run_exports_and_persists() {
        let tmp  = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        let out  = tmp.path().join("out");
        fs::create_dir_all(&data).unwrap();
        write_articles(&data);

        let cfg    = tiny_config(&data, &tmp.path().join("no-base"), Some(&out));
        let report = TrainUseCase::new(cfg).run::<B>(Default::default()).unwrap();

        assert!(!report.history.is_empty());
        assert!(report.steps >= 2);

        // Partitions: 3 per label in train, 1 each in test and dev
        assert_eq!(read_json(&data.join("train.json")).unwrap().len(), 9);
        assert_eq!(read_json(&data.join("test.json")).unwrap().len(), 3);
        assert_eq!(read_json(&data.join("dev.json")).unwrap().len(), 3);
        for stem in ["train", "test", "dev"] {
            assert!(data.join(format!("{stem}.md")).exists());
        }
        assert!(data.join("labels.json").exists());

        for name in [
            "model.mpk", "encoder.mpk", "config.json", "labels.json",
            "tokenizer.json", "train_config.json", "metrics.csv",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }
        let labels = ModelStore::new(&out).load_labels().unwrap();
        assert_eq!(labels.len(), 3);
        assert!(LABELS.iter().all(|l| labels.contains(l)));
    }

    #[test]
    fn test_second_run_starts_from_saved_model() {
        let tmp  = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        let base = tmp.path().join("base");
        fs::create_dir_all(&data).unwrap();
        write_articles(&data);

        TrainUseCase::new(tiny_config(&data, &tmp.path().join("none"), Some(&base)))
            .run::<B>(Default::default())
            .unwrap();

        // Architecture flags differ from the saved config.json and are ignored
        let mut cfg = tiny_config(&data, &base, None);
        cfg.d_model = 32;
        cfg.sentence_split = true;
        cfg.preprocess = true;
        let report = TrainUseCase::new(cfg).run::<B>(Default::default()).unwrap();
        assert!(!report.history.is_empty());
    }

    #[test]
    fn test_missing_csv_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = tiny_config(tmp.path(), tmp.path(), None);
        assert!(TrainUseCase::new(cfg).run::<B>(Default::default()).is_err());
    }

    #[test]
    fn test_singleton_label_fails_before_training() {
        let tmp = tempfile::tempdir().unwrap();
        write_articles(tmp.path());
        let mut csv = fs::read_to_string(tmp.path().join("articles.csv")).unwrap();
        csv.push_str("Kultur;Ein einzelner Artikel\n");
        fs::write(tmp.path().join("articles.csv"), csv).unwrap();

        let cfg = tiny_config(tmp.path(), tmp.path(), None);
        let err = TrainUseCase::new(cfg).run::<B>(Default::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Kultur"));
        assert!(!tmp.path().join("train.json").exists());
    }

    #[test]
    fn test_vocab_without_word_ids_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_articles(tmp.path());

        let mut cfg = tiny_config(tmp.path(), tmp.path(), None);
        cfg.vocab_size = FIRST_WORD_ID;
        assert!(cfg.validate().is_err());

        let err = TrainUseCase::new(cfg).run::<B>(Default::default()).unwrap_err();
        assert!(err.to_string().contains("vocab_size"));
        assert!(!tmp.path().join("train.json").exists());

        let ok = TrainConfig { vocab_size: FIRST_WORD_ID + 1, ..TrainConfig::default() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_loop_config_mirrors_fields() {
        let cfg  = TrainConfig { batch_size: 7, patience: 9, ..TrainConfig::default() };
        let loop_cfg = cfg.loop_config();
        assert_eq!(loop_cfg.batch_size, 7);
        assert_eq!(loop_cfg.patience, 9);
        assert_eq!(cfg.model_config().d_model, 256);
    }
}
