// ============================================================
// Layer 4 — Sentencizer
// ============================================================
// Splits an article into sentences so that --sentence_split
// can train on one sentence per example instead of one
// article per example.
//
// Rule: a sentence ends after a terminal punctuation mark
// ('.', '!', '?', '…'), plus any closing quotes or brackets
// that follow it, when the next character is whitespace.
//
// Example:
//   "Der ORF berichtet. Wien wählt! „Wer gewinnt?“ Niemand."
//   → ["Der ORF berichtet.", "Wien wählt!", "„Wer gewinnt?“", "Niemand."]
//
// Decimal points and times ("2.5", "20.15 Uhr") survive
// because the '.' is not followed by whitespace there.
//
// Every sentence inherits its article's label distribution.
//
// Reference: Rust Book §8 (Strings), §13 (Iterators)

use crate::domain::traits::TrainingExample;

const TERMINALS: [char; 4] = ['.', '!', '?', '…'];
const CLOSERS:   [char; 7] = ['"', '\'', ')', ']', '»', '“', '”'];

pub struct Sentencizer;

impl Sentencizer {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into trimmed, non-empty sentences.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut sentences = Vec::new();
        let mut start     = 0usize;
        let mut chars     = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !TERMINALS.contains(&c) {
                continue;
            }

            // Absorb repeated terminals and closing quotes: "?!", "."»
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if TERMINALS.contains(&next) || CLOSERS.contains(&next) {
                    end = j + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
            if at_boundary {
                push_trimmed(&mut sentences, &text[start..end]);
                start = end;
            }
        }

        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }

    /// Explode every example into one example per sentence, each sharing
    /// the parent's label distribution.
    pub fn explode(&self, examples: Vec<TrainingExample>) -> Vec<TrainingExample> {
        let mut out = Vec::with_capacity(examples.len());
        for example in examples {
            for sentence in self.split(&example.text) {
                out.push(TrainingExample::new(sentence, example.cats.clone()));
            }
        }
        out
    }
}

impl Default for Sentencizer {
    fn default() -> Self {
        Self::new()
    }
}

fn push_trimmed<'t>(out: &mut Vec<&'t str>, piece: &'t str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}
