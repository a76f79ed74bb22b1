// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that name the core concepts
// of the fine-tuning run:
//
//   record.rs     — a labelled article and the partitions it lands in
//   label.rs      — the frozen label set and per-label distributions
//   checkpoint.rs — evaluation results and the bounded history of them
//   errors.rs     — typed failures raised by the data layer
//   traits.rs     — the seams other layers implement
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A labelled article and its train/test/dev partition
pub mod record;

// LabelSet and CatDistribution
pub mod label;

// CheckpointResult and CheckpointHistory
pub mod checkpoint;

// FinetuneError taxonomy
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
