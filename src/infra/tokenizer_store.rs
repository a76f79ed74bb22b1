// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Provides the tokenizer the classifier is trained with.
//
// A base model directory that already holds tokenizer.json
// keeps its vocabulary, so fine-tuning starts from the same
// token ids its encoder weights were trained on. Otherwise a
// word-level tokenizer is built from the training texts.
//
// The word-level tokenizer is assembled as HuggingFace JSON in
// memory and parsed with Tokenizer::from_bytes; tokenizers 0.15
// trainers cannot produce a ModelWrapper-typed WordLevel model.
//
// Special tokens use fixed BERT ids; words start at 104:
//   [PAD]=0  [UNK]=1  [CLS]=101  [SEP]=102  [MASK]=103

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::domain::errors::FinetuneError;

/// First id handed to a corpus word.
pub const FIRST_WORD_ID: usize = 104;

const SPECIAL_TOKENS: [(&str, usize); 5] = [
    ("[PAD]", 0),
    ("[UNK]", 1),
    ("[CLS]", 101),
    ("[SEP]", 102),
    ("[MASK]", 103),
];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    /// `dir` is the base model directory given on the command line.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load the base model's tokenizer or build a new one from `texts`.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.path();
        if tok_path.exists() {
            tracing::info!("Loading tokenizer from '{}'", tok_path.display());
            self.load()
        } else {
            tracing::info!(
                "No tokenizer in '{}', building word-level vocabulary (vocab_size={})",
                self.dir.display(),
                vocab_size
            );
            build_word_level(texts, vocab_size)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        let tokenizer = Tokenizer::from_file(&path).map_err(|e| {
            FinetuneError::Framework(format!("Cannot load tokenizer from '{}': {e}", path.display()))
        })?;
        Ok(tokenizer)
    }
}

/// Write `tokenizer` as `<dir>/tokenizer.json`.
pub fn save(tokenizer: &Tokenizer, dir: &Path) -> Result<()> {
    let path = dir.join("tokenizer.json");
    tokenizer.save(&path, true).map_err(|e| {
        FinetuneError::Framework(format!("Cannot write tokenizer to '{}': {e}", path.display()))
    })?;
    Ok(())
}

/// Build a lowercasing word-level tokenizer holding the most frequent
/// words of `texts`, `vocab_size` bounding the highest id.
pub fn build_word_level(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    // ── Step 1: Count word frequencies ────────────────────────────────────────
    // Split on anything that is not alphanumeric, the same boundaries the
    // Whitespace pre-tokenizer draws around words
    let mut counts: HashMap<String, usize> = HashMap::new();
    texts
        .iter()
        .flat_map(|text| text.split(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .for_each(|w| *counts.entry(w.to_lowercase()).or_default() += 1);

    // Most frequent first, alphabetical among equals so ids are reproducible
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(vocab_size.saturating_sub(FIRST_WORD_ID));

    // ── Step 2: Vocab map ─────────────────────────────────────────────────────
    let mut vocab = serde_json::Map::new();
    for (token, id) in SPECIAL_TOKENS {
        vocab.insert(token.to_string(), serde_json::json!(id));
    }
    let mut next_id = FIRST_WORD_ID;
    for (word, _) in ranked {
        if !vocab.contains_key(&word) {
            vocab.insert(word, serde_json::json!(next_id));
            next_id += 1;
        }
    }

    // ── Step 3: HuggingFace tokenizer JSON ────────────────────────────────────
    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .map(|(content, id)| {
            serde_json::json!({
                "id": id, "content": content, "single_word": false,
                "lstrip": false, "rstrip": false, "normalized": false, "special": true
            })
        })
        .collect();

    // Lowercase, keep accents
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": false,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    let bytes = serde_json::to_vec(&tokenizer_json).context("Cannot serialise tokenizer JSON")?;
    let tokenizer = Tokenizer::from_bytes(bytes)
        .map_err(|e| FinetuneError::Framework(format!("Cannot build word-level tokenizer: {e}")))?;

    tracing::info!("Tokenizer built with {} words", next_id - FIRST_WORD_ID);
    Ok(tokenizer)
}
