// ============================================================
// Layer 5 — Burn Classifier
// ============================================================
// The concrete TextClassifier: a transformer encoder with a
// pooled softmax head, trained with Adam.
//
// update(batch, lr):
//   1. tokenise the batch texts (TextBatcher)
//   2. targets = arg-max index of each one-hot CatDistribution
//   3. forward + cross-entropy loss on the autodiff backend
//   4. backward, GradientsParams, one Adam step at lr
//
// infer(texts):
//   model.valid() drops the autodiff graph and disables
//   dropout, so predictions run on the inner backend
//   (Wgpu for training, NdArray in tests).
//
// No averaged parameters are kept; the trait's default
// with_averaged_params evaluates the current weights.
//
// Reference: Burn Book §5 (Training)
//            Kingma & Ba (2015) Adam

use anyhow::{Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, decay::WeightDecayConfig, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::Path;
use tokenizers::Tokenizer;

use crate::data::batcher::TextBatcher;
use crate::domain::errors::FinetuneError;
use crate::domain::label::{CatDistribution, LabelSet};
use crate::domain::traits::{TextClassifier, TrainingExample};
use crate::infra::{model_store::ModelStore, tokenizer_store};
use crate::ml::model::{TextClassifierConfig, TextClassifierModel};

/// Backend used by the command-line run.
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// L2 penalty folded into every Adam step.
pub const WEIGHT_DECAY: f32 = 0.005;

pub struct BurnClassifier<B: AutodiffBackend> {
    model:   TextClassifierModel<B>,
    optim:   OptimizerAdaptor<Adam, TextClassifierModel<B>, B>,
    batcher: TextBatcher,
    labels:  LabelSet,
    config:  TextClassifierConfig,
    device:  B::Device,
}

impl<B: AutodiffBackend> BurnClassifier<B> {
    /// Fresh model for `labels`. `config.num_labels` is overwritten with
    /// the label count. Fails when the tokenizer's special ids do not fit
    /// `config.vocab_size`.
    pub fn new(
        config:    TextClassifierConfig,
        labels:    LabelSet,
        tokenizer: Tokenizer,
        device:    B::Device,
    ) -> Result<Self> {
        let mut config = config;
        config.num_labels = labels.len();

        let batcher = TextBatcher::new(tokenizer, config.max_seq_len, config.vocab_size)?;
        let model   = config.init::<B>(&device);
        let optim   = AdamConfig::new()
            .with_epsilon(1e-8)
            .with_weight_decay(Some(WeightDecayConfig::new(WEIGHT_DECAY)))
            .init::<B, TextClassifierModel<B>>();

        tracing::info!(
            "Classifier ready: {} labels, {} layers, d_model={}",
            labels.len(),
            config.num_layers,
            config.d_model
        );
        Ok(Self { model, optim, batcher, labels, config, device })
    }

    /// Start the encoder from the weights stored in `base`.
    pub fn with_base_encoder(mut self, base: &ModelStore) -> Result<Self> {
        let encoder = self.model.encoder.clone();
        self.model.encoder = base.load_encoder(encoder, &self.device)?;
        Ok(self)
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn config(&self) -> &TextClassifierConfig {
        &self.config
    }

    fn targets(&self, batch: &[TrainingExample]) -> Result<Tensor<B, 1, Int>> {
        let idx = batch
            .iter()
            .map(|ex| {
                ex.cats
                    .argmax_index()
                    .map(|i| i as i32)
                    .ok_or_else(|| FinetuneError::Framework(format!("empty label distribution for '{}'", ex.text)))
            })
            .collect::<Result<Vec<i32>, FinetuneError>>()?;
        Ok(Tensor::<B, 1, Int>::from_ints(idx.as_slice(), &self.device))
    }
}

impl<B: AutodiffBackend> TextClassifier for BurnClassifier<B> {
    fn update(&mut self, batch: &[TrainingExample], learn_rate: f64) -> Result<f64> {
        if batch.is_empty() {
            return Ok(0.0);
        }
        let texts: Vec<&str> = batch.iter().map(|ex| ex.text.as_str()).collect();
        let inputs  = self.batcher.batch::<B>(&texts, &self.device)?;
        let targets = self.targets(batch)?;

        let loss = self.model.forward_loss(inputs.input_ids, inputs.attention_mask, targets);
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(learn_rate, self.model.clone(), grads);

        Ok(loss_val)
    }

    fn infer(&self, texts: &[String]) -> Result<Vec<CatDistribution>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model  = self.model.valid();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let inputs = self.batcher.batch::<B::InnerBackend>(&refs, &self.device)?;

        let probs: Vec<f32> = model
            .forward_probs(inputs.input_ids, inputs.attention_mask)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| FinetuneError::Framework(format!("Cannot read probabilities: {e:?}")))?;

        Ok(probs
            .chunks(self.labels.len())
            .map(|row| CatDistribution::from_scores(&self.labels, row))
            .collect())
    }

    fn persist(&self, dir: &Path) -> Result<()> {
        let store = ModelStore::new(dir);
        store.save_model(&self.model, &self.config)?;
        store.save_labels(&self.labels)?;
        tokenizer_store::save(self.batcher.tokenizer(), dir)
            .with_context(|| format!("Cannot persist tokenizer to '{}'", dir.display()))?;
        tracing::info!("Model saved to '{}'", dir.display());
        Ok(())
    }
}
