// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that trains or scores a classifier.
//
//   model.rs      — Transformer encoder classifier (Burn):
//                   token + position embeddings, encoder
//                   blocks, [CLS] pooler, label head
//
//   classifier.rs — BurnClassifier, the TextClassifier
//                   implementation wrapping model + Adam
//
//   schedule.rs   — Cyclic triangular learning rate
//
//   evaluator.rs  — Micro-batched top-1 accuracy
//
//   trainer.rs    — Training loop with periodic evaluation
//                   and patience-based early stopping
//
// The evaluator and training loop only see the TextClassifier
// trait, so they are tested with scripted fakes and never
// touch Burn.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// Transformer encoder classifier architecture
pub mod model;

/// Burn-backed TextClassifier
pub mod classifier;

/// Learning-rate schedule
pub mod schedule;

/// Accuracy evaluation
pub mod evaluator;

/// Training loop with early stopping
pub mod trainer;
