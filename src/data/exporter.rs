// ============================================================
// Layer 4 — Partition Exporter
// ============================================================
// Persists each partition twice, for two kinds of consumers:
//
//   <stem>.json — a JSON array of [label, text] pairs, for the
//                 evaluation scripts that read JSON
//
//   <stem>.md   — intent blocks for Markdown-based NLU tools:
//
//                   ## intent:Sport
//                   - Das Spiel endete 2:1
//                   - ...
//                   ## intent:Kultur
//                   - ...
//
//                 Headers appear in the order their label is
//                 first met in the partition; bullets keep the
//                 partition's row order.
//
// and writes the frozen label set to labels.json.
//
// One routine serves all three partitions; only the file stem
// changes between them.
//
// Reference: serde_json documentation (to_writer)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::label::LabelSet;
use crate::domain::record::{Partition, Record};

/// Writes partitions and labels into one directory.
pub struct PartitionExporter {
    dir: PathBuf,
}

impl PartitionExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `<stem>.json` and `<stem>.md` for one partition.
    pub fn export(&self, partition: &Partition) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let stem = partition.kind.file_stem();
        self.write_json(&self.dir.join(format!("{stem}.json")), &partition.records)?;
        self.write_markdown(&self.dir.join(format!("{stem}.md")), &partition.records)?;

        tracing::debug!(
            "Exported {} {} records to '{}'",
            partition.len(),
            stem,
            self.dir.display()
        );
        Ok(())
    }

    /// Write the label set as a JSON array to `labels.json`.
    pub fn export_labels(&self, labels: &LabelSet) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join("labels.json");
        let file = File::create(&path)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, labels)?;
        writer.flush()?;
        Ok(())
    }

    fn write_json(&self, path: &Path, records: &[Record]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, records)?;
        writer.flush()?;
        Ok(())
    }

    fn write_markdown(&self, path: &Path, records: &[Record]) -> Result<()> {
        fs::write(path, render_intents(records))
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }
}

/// Render records as `## intent:<label>` blocks with one `- <text>` bullet
/// per record.
pub fn render_intents(records: &[Record]) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for r in records {
        match groups.iter_mut().find(|(label, _)| *label == r.label) {
            Some((_, texts)) => texts.push(r.text.as_str()),
            None => groups.push((r.label.as_str(), vec![r.text.as_str()])),
        }
    }

    let mut out = String::new();
    for (label, texts) in groups {
        out.push_str("## intent:");
        out.push_str(label);
        out.push('\n');
        for text in texts {
            out.push_str("- ");
            out.push_str(text);
            out.push('\n');
        }
    }
    out
}

/// Read a `<stem>.json` export back into records.
pub fn read_json(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
