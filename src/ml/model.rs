// ============================================================
// Layer 5 — Text Classifier Model
// ============================================================
// BERT-style sequence classifier:
//
//   ids ─► token_emb + pos_emb ─► dropout
//       ─► EncoderLayer × num_layers   (post-norm)
//       ─► LayerNorm
//       ─► hidden[:, 0]  ([CLS] position)
//       ─► Linear + tanh  (pooler)
//       ─► dropout ─► Linear  (one logit per label)
//
// EncoderLayer:
//   h = norm(x + drop(self_attn(x, pad_mask)))
//   y = norm(h + drop(W2 · gelu(W1 · h)))
//
// The encoder is its own module so its weights can be saved
// and loaded separately from the label-specific head.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, LayerNorm, LayerNormConfig, Linear,
        LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, softmax, tanh},
};

/// Architecture of the classifier. `num_labels` is set from the
/// training label set; everything else comes from the base model's
/// config.json or the command line.
#[derive(Config, Debug)]
pub struct TextClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
    pub num_labels:  usize,
}

impl TextClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifierModel<B> {
        TextClassifierModel {
            encoder: self.init_encoder(device),
            pooler:  LinearConfig::new(self.d_model, self.d_model).init(device),
            head:    LinearConfig::new(self.d_model, self.num_labels).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }

    pub fn init_encoder<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        TextEncoder {
            token_emb: EmbeddingConfig::new(self.vocab_size, self.d_model).init(device),
            pos_emb:   EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device),
            layers:    (0..self.num_layers).map(|_| self.init_layer(device)).collect(),
            norm:      LayerNormConfig::new(self.d_model).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        }
    }

    fn init_layer<B: Backend>(&self, device: &B::Device) -> EncoderLayer<B> {
        EncoderLayer {
            attention: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            attn_norm: LayerNormConfig::new(self.d_model).init(device),
            ff_in:     LinearConfig::new(self.d_model, self.d_ff).init(device),
            ff_out:    LinearConfig::new(self.d_ff, self.d_model).init(device),
            ff_norm:   LayerNormConfig::new(self.d_model).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    pub attention: MultiHeadAttention<B>,
    pub attn_norm: LayerNorm<B>,
    pub ff_in:     Linear<B>,
    pub ff_out:    Linear<B>,
    pub ff_norm:   LayerNorm<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> EncoderLayer<B> {
    /// pad_mask: [batch, seq_len], true at padding positions
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attended = self
            .attention
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let h = self.attn_norm.forward(x + self.dropout.forward(attended));

        let ff = self.ff_out.forward(gelu(self.ff_in.forward(h.clone())));
        self.ff_norm.forward(h + self.dropout.forward(ff))
    }
}

#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_emb: Embedding<B>,
    pub pos_emb:   Embedding<B>,
    pub layers:    Vec<EncoderLayer<B>>,
    pub norm:      LayerNorm<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids, attention_mask: [batch, seq_len] → [batch, seq_len, d_model]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch, seq_len]);
        let embedded = self.token_emb.forward(input_ids) + self.pos_emb.forward(positions);

        let pad_mask = attention_mask.equal_elem(0);
        let hidden = self
            .layers
            .iter()
            .fold(self.dropout.forward(embedded), |x, layer| layer.forward(x, pad_mask.clone()));
        self.norm.forward(hidden)
    }
}

#[derive(Module, Debug)]
pub struct TextClassifierModel<B: Backend> {
    pub encoder: TextEncoder<B>,
    pub pooler:  Linear<B>,
    pub head:    Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> TextClassifierModel<B> {
    /// → logits: [batch, num_labels]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let hidden = self.encoder.forward(input_ids, attention_mask);
        let [batch, _, d_model] = hidden.dims();

        let cls    = hidden.slice([0..batch, 0..1, 0..d_model]).reshape([batch, d_model]);
        let pooled = tanh(self.pooler.forward(cls));
        self.head.forward(self.dropout.forward(pooled))
    }

    /// → probabilities: [batch, num_labels], rows sum to 1
    pub fn forward_probs(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        softmax(self.forward(input_ids, attention_mask), 1)
    }

    /// Mean cross-entropy against label indices [batch].
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        targets:        Tensor<B, 1, Int>,
    ) -> Tensor<B, 1> {
        let logits = self.forward(input_ids, attention_mask);
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }
}
