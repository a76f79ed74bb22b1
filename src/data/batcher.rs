// ============================================================
// Layer 4 — Text Batcher
// ============================================================
// Tokenises a slice of texts and stacks them into the integer
// tensors the classifier consumes.
//
// Sequence format per text:
//   [CLS] tok tok tok ... [PAD] [PAD]
//
// The classifier pools the [CLS] position, so it is always
// first. Sequences are truncated to max_seq_len and padded to
// the longest sequence in the batch, not to max_seq_len.
//
// Token ids outside the model's embedding table (possible
// with a tokenizer larger than the configured vocab) map to
// [UNK] instead of indexing past the table. [CLS] and [UNK]
// must themselves fit, or the batcher refuses to build.
//
// Reference: Burn Book §4 (Batcher)
//            tokenizers crate documentation

use anyhow::Result;
use burn::prelude::*;
use tokenizers::Tokenizer;

use crate::domain::errors::FinetuneError;

pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;
pub const CLS_ID: u32 = 101;

/// A batch of tokenised texts.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct TextBatch<B: Backend> {
    /// Token ID sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,
}

/// Token ids for each text, before padding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTexts {
    pub ids:     Vec<Vec<u32>>,
    pub seq_len: usize,
}

#[derive(Clone)]
pub struct TextBatcher {
    tokenizer:   Tokenizer,
    max_seq_len: usize,
    vocab_size:  usize,
    cls_id:      u32,
    unk_id:      u32,
}

impl TextBatcher {
    /// Fails when `[CLS]` or `[UNK]` has no row in an embedding table of
    /// `vocab_size` entries.
    pub fn new(
        tokenizer:   Tokenizer,
        max_seq_len: usize,
        vocab_size:  usize,
    ) -> Result<Self, FinetuneError> {
        let cls_id = tokenizer.token_to_id("[CLS]").unwrap_or(CLS_ID);
        let unk_id = tokenizer.token_to_id("[UNK]").unwrap_or(UNK_ID);

        for (name, id) in [("[CLS]", cls_id), ("[UNK]", unk_id)] {
            if id as usize >= vocab_size {
                return Err(FinetuneError::Framework(format!(
                    "{name} has id {id}, outside an embedding table of {vocab_size} tokens"
                )));
            }
        }

        Ok(Self {
            tokenizer,
            max_seq_len: max_seq_len.max(1),
            vocab_size,
            cls_id,
            unk_id,
        })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Tokenise `texts` into [CLS]-prefixed, truncated id sequences.
    pub fn encode_ids(&self, texts: &[&str]) -> Result<EncodedTexts> {
        let mut ids     = Vec::with_capacity(texts.len());
        let mut seq_len = 1usize;

        for text in texts {
            let enc = self
                .tokenizer
                .encode(*text, false)
                .map_err(|e| FinetuneError::Framework(format!("Tokenisation error: {e}")))?;

            let mut seq = Vec::with_capacity(self.max_seq_len);
            seq.push(self.cls_id);
            seq.extend(enc.get_ids().iter().map(|&id| {
                if (id as usize) < self.vocab_size { id } else { self.unk_id }
            }));
            seq.truncate(self.max_seq_len);

            seq_len = seq_len.max(seq.len());
            ids.push(seq);
        }

        Ok(EncodedTexts { ids, seq_len })
    }

    /// Tokenise and stack `texts` into tensors on `device`.
    pub fn batch<B: Backend>(&self, texts: &[&str], device: &B::Device) -> Result<TextBatch<B>> {
        let encoded    = self.encode_ids(texts)?;
        let batch_size = encoded.ids.len();
        let seq_len    = encoded.seq_len;

        // ── Flatten with padding ──────────────────────────────────────────────
        let mut input_flat = Vec::with_capacity(batch_size * seq_len);
        let mut mask_flat  = Vec::with_capacity(batch_size * seq_len);
        for seq in &encoded.ids {
            input_flat.extend(seq.iter().map(|&id| id as i32));
            mask_flat.extend(std::iter::repeat(1i32).take(seq.len()));

            let pad = seq_len - seq.len();
            input_flat.extend(std::iter::repeat(PAD_ID as i32).take(pad));
            mask_flat.extend(std::iter::repeat(0i32).take(pad));
        }

        let input_ids = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), device)
            .reshape([batch_size, seq_len]);
        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), device)
            .reshape([batch_size, seq_len]);

        Ok(TextBatch { input_ids, attention_mask })
    }
}
