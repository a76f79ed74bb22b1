// ============================================================
// Layer 4 — Label Vectorizer
// ============================================================
// Turns a record's scalar label into the dense one-hot
// CatDistribution the classifier trains against.
//
// Example with LabelSet = [Sport, Kultur, Web]:
//   ("Kultur", "...") → { Sport: 0.0, Kultur: 1.0, Web: 0.0 }
//
// A label missing from the frozen set is an UnknownLabel
// error. This can only happen for eval/dev records whose
// label never made it into the training partition; it is
// reported, not papered over.

use crate::domain::errors::FinetuneError;
use crate::domain::label::{CatDistribution, LabelSet};
use crate::domain::record::Record;
use crate::domain::traits::TrainingExample;

/// Vectorizes records against a frozen label set.
pub struct LabelVectorizer<'a> {
    labels: &'a LabelSet,
}

impl<'a> LabelVectorizer<'a> {
    pub fn new(labels: &'a LabelSet) -> Self {
        Self { labels }
    }

    pub fn vectorize(&self, record: &Record) -> Result<CatDistribution, FinetuneError> {
        let index = self
            .labels
            .index_of(&record.label)
            .ok_or_else(|| FinetuneError::UnknownLabel(record.label.clone()))?;
        Ok(CatDistribution::one_hot(self.labels, index))
    }

    /// Vectorize every record into a training example.
    pub fn examples(&self, records: &[Record]) -> Result<Vec<TrainingExample>, FinetuneError> {
        records
            .iter()
            .map(|r| Ok(TrainingExample::new(r.text.clone(), self.vectorize(r)?)))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vector_has_k_entries_summing_to_one() {
        let labels  = LabelSet::from_labels(["Sport", "Kultur", "Web", "Etat"]);
        let vec     = LabelVectorizer::new(&labels);
        for label in labels.iter() {
            let cats = vec.vectorize(&Record::new(label, "text")).unwrap();
            assert_eq!(cats.len(), 4);
            assert_eq!(cats.total(), 1.0);
            assert_eq!(cats.get(label), Some(1.0));
            assert_eq!(cats.iter().filter(|(_, s)| *s == 1.0).count(), 1);
        }
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let labels = LabelSet::from_labels(["Sport"]);
        let err    = LabelVectorizer::new(&labels)
            .vectorize(&Record::new("Inland", "text"))
            .unwrap_err();
        assert!(matches!(err, FinetuneError::UnknownLabel(l) if l == "Inland"));
    }

    #[test]
    fn test_examples_keep_order_and_text() {
        let labels  = LabelSet::from_labels(["a", "b"]);
        let records = vec![Record::new("b", "first"), Record::new("a", "second")];
        let ex      = LabelVectorizer::new(&labels).examples(&records).unwrap();
        assert_eq!(ex[0].text, "first");
        assert_eq!(ex[0].cats.argmax(), Some("b"));
        assert_eq!(ex[1].cats.argmax(), Some("a"));
    }
}
