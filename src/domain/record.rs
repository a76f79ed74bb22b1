// ============================================================
// Layer 3 — Record and Partition Domain Types
// ============================================================
// A Record is one row of the raw dataset: a label and the
// article text it was assigned to. Records are read once and
// never mutated afterwards.
//
// On disk a Record is a JSON 2-tuple: ["label", "text"].
// serde's from/into attributes route (de)serialisation through
// a plain (String, String) tuple so the named fields stay
// readable in Rust while the wire format stays positional.
//
// A Partition is an ordered run of Records assigned to one of
// the three splits. The eval split is persisted under the
// "test" file stem.
//
// Reference: Rust Book §5 (Structs), serde container attributes

use serde::{Deserialize, Serialize};

/// One labelled article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Record {
    pub label: String,
    pub text:  String,
}

impl Record {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text:  text.into(),
        }
    }
}

impl From<(String, String)> for Record {
    fn from((label, text): (String, String)) -> Self {
        Self { label, text }
    }
}

impl From<Record> for (String, String) {
    fn from(r: Record) -> Self {
        (r.label, r.text)
    }
}

/// Which split a partition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    /// Used to update model weights
    Train,
    /// Held out and evaluated periodically during training
    Test,
    /// Held out entirely; only exported
    Dev,
}

impl PartitionKind {
    /// File stem used for the JSON and Markdown exports
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test  => "test",
            Self::Dev   => "dev",
        }
    }
}

/// An ordered sequence of records assigned to one split.
#[derive(Debug, Clone)]
pub struct Partition {
    pub kind:    PartitionKind,
    pub records: Vec<Record>,
}

impl Partition {
    pub fn new(kind: PartitionKind, records: Vec<Record>) -> Self {
        Self { kind, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels in row order, one per record
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.label.as_str())
    }
}
