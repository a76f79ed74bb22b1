// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Optional clean-up applied to article texts before they are
// vectorised (enabled with --preprocess).
//
// Steps (applied in order):
//   1. Escape sentence tags that would clash with tokenizer
//      markup: "<s>" → "<open-s-tag>", "</s>" → "<close-s-tag>"
//   2. Collapse every whitespace run to a single space, trim
//   3. Unicode NFD decomposition, then drop combining marks,
//      so "Österreich" becomes "Osterreich"
//
// Step 3 reuses the normalizers that ship with the tokenizers
// crate rather than a hand-rolled decomposition table.
//
// Reference: Rust Book §8 (Strings in Rust)
//            tokenizers crate documentation (normalizers)

use anyhow::Result;
use tokenizers::normalizers::{strip::StripAccents, unicode::NFD};
use tokenizers::{NormalizedString, Normalizer};

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, text: &str) -> Result<String> {
        // ── Step 1: Escape sentence tags ──────────────────────────────────────
        let escaped = text
            .replace("<s>", "<open-s-tag>")
            .replace("</s>", "<close-s-tag>");

        // ── Step 2: Collapse whitespace ───────────────────────────────────────
        // split_whitespace() skips every Unicode whitespace run, so joining
        // with a single space both collapses and trims
        let collapsed = escaped.split_whitespace().collect::<Vec<_>>().join(" ");

        // ── Step 3: Strip accents ─────────────────────────────────────────────
        let mut normalized = NormalizedString::from(collapsed.as_str());
        NFD.normalize(&mut normalized)
            .map_err(|e| anyhow::anyhow!("NFD normalisation failed: {e}"))?;
        StripAccents
            .normalize(&mut normalized)
            .map_err(|e| anyhow::anyhow!("Accent stripping failed: {e}"))?;

        Ok(normalized.get().to_string())
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  Wien \t\n  ist   schön ").unwrap(), "Wien ist schon");
    }

    #[test]
    fn test_escapes_sentence_tags() {
        let p = Preprocessor::new();
        assert_eq!(
            p.clean("<s>Satz</s>").unwrap(),
            "<open-s-tag>Satz<close-s-tag>"
        );
    }

    #[test]
    fn test_strips_accents() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Österreich café").unwrap(), "Osterreich cafe");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("").unwrap(), "");
    }
}
