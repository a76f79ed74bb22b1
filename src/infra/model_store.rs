// ============================================================
// Layer 6 — Model Store
// ============================================================
// Reads a base model directory and writes a fine-tuned one.
// Weights go through a full-precision named MessagePack
// recorder, so a saved model reloads bit for bit.
//
// Files in a model directory:
//   model.mpk          — all classifier weights
//   encoder.mpk        — encoder weights only; the part a later
//                        run with different labels can reuse
//   config.json        — TextClassifierConfig (architecture)
//   labels.json        — LabelSet, one entry per output logit
//   tokenizer.json     — HuggingFace tokenizer
//   train_config.json  — the TrainConfig of the run
//   metrics.csv        — one row per evaluation
//
// The recorder appends the .mpk extension itself, so paths
// are passed without it. Recorder and config.json failures
// surface as FinetuneError::Framework.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::errors::FinetuneError;
use crate::domain::label::LabelSet;
use crate::ml::model::{TextClassifierConfig, TextClassifierModel, TextEncoder};

type WeightRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn encoder_stem(&self) -> PathBuf {
        self.dir.join("encoder")
    }

    pub fn has_encoder(&self) -> bool {
        self.encoder_stem().with_extension("mpk").exists()
    }

    /// Architecture of the base model, if the directory has one.
    pub fn load_config(&self) -> Result<Option<TextClassifierConfig>> {
        let path = self.dir.join("config.json");
        if !path.exists() {
            return Ok(None);
        }
        let config = TextClassifierConfig::load(&path).map_err(|e| {
            FinetuneError::Framework(format!("Cannot read model config '{}': {e}", path.display()))
        })?;
        Ok(Some(config))
    }

    /// Restore saved encoder weights into `encoder`.
    pub fn load_encoder<B: Backend>(
        &self,
        encoder: TextEncoder<B>,
        device:  &B::Device,
    ) -> Result<TextEncoder<B>> {
        let path = self.encoder_stem();
        tracing::info!("Loading encoder weights from '{}.mpk'", path.display());
        let encoder = encoder
            .load_file(path.clone(), &WeightRecorder::new(), device)
            .map_err(|e| {
                FinetuneError::Framework(format!(
                    "Cannot load encoder '{}.mpk' ({e}). Does config.json match the weights?",
                    path.display()
                ))
            })?;
        Ok(encoder)
    }

    /// Write weights, encoder weights, and architecture.
    pub fn save_model<B: Backend>(
        &self,
        model:  &TextClassifierModel<B>,
        config: &TextClassifierConfig,
    ) -> Result<()> {
        self.ensure_dir()?;
        let recorder = WeightRecorder::new();

        let model_path = self.dir.join("model");
        model
            .clone()
            .save_file(model_path.clone(), &recorder)
            .map_err(|e| {
                FinetuneError::Framework(format!("Failed to save model to '{}': {e}", model_path.display()))
            })?;

        let encoder_path = self.encoder_stem();
        model
            .encoder
            .clone()
            .save_file(encoder_path.clone(), &recorder)
            .map_err(|e| {
                FinetuneError::Framework(format!("Failed to save encoder to '{}': {e}", encoder_path.display()))
            })?;

        let config_path = self.dir.join("config.json");
        config
            .save(&config_path)
            .map_err(|e| {
                FinetuneError::Framework(format!("Cannot write '{}': {e}", config_path.display()))
            })?;

        tracing::debug!("Saved model weights to '{}'", self.dir.display());
        Ok(())
    }

    pub fn save_labels(&self, labels: &LabelSet) -> Result<()> {
        self.write_json("labels.json", labels)
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    pub fn load_labels(&self) -> Result<LabelSet> {
        let path = self.dir.join("labels.json");
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))
    }
}
