// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV to tensor batches.
//
//   data/articles.csv
//       │
//       ▼
//   CsvLoader         → label;article rows → Records
//       │
//       ▼
//   DatasetSplitter   → stratified train / test / dev
//       │
//       ├──► PartitionExporter → <stem>.json, <stem>.md, labels.json
//       ▼
//   LabelVectorizer   → Record → (text, one-hot CatDistribution)
//       │
//       ▼
//   Preprocessor      → optional text normalisation
//       │
//       ▼
//   Sentencizer       → optional one-example-per-sentence
//       │
//       ▼
//   TextBatcher       → token ids + attention mask tensors
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads the `;`-delimited article CSV
pub mod loader;

/// Stratified three-way split
pub mod splitter;

/// JSON and Markdown partition export
pub mod exporter;

/// Label → dense one-hot distribution
pub mod vectorizer;

/// Optional text normalisation
pub mod preprocessor;

/// Rule-based sentence splitting
pub mod sentencizer;

/// Tokenisation and tensor batching
pub mod batcher;
