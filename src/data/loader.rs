// ============================================================
// Layer 4 — Article Loader
// ============================================================
// Reads the raw dataset from a semicolon-delimited CSV file
// with no header row and two columns:
//
//   <label>;<article text>
//
// The csv crate handles quoting, so an article may contain
// semicolons as long as the field is wrapped in double quotes.
//
// Rows with the wrong number of fields are skipped with a
// warning.
// A file that yields no usable rows at all is an error.
//
// Reference: csv crate documentation (ReaderBuilder)
//            Rust Book §9 (Error Handling)

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::domain::errors::FinetuneError;
use crate::domain::record::Record;
use crate::domain::traits::RecordSource;

/// Loads labelled articles from a `label;article` CSV file.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            // Let short/long rows through so we can skip them ourselves
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| {
                FinetuneError::InputData(format!(
                    "cannot open '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (line, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping line {}: {}", line + 1, e);
                    skipped += 1;
                    continue;
                }
            };

            if row.len() != 2 {
                tracing::warn!(
                    "Skipping line {}: expected 2 fields, found {}",
                    line + 1,
                    row.len()
                );
                skipped += 1;
                continue;
            }

            records.push(Record::new(&row[0], &row[1]));
        }

        if records.is_empty() {
            return Err(FinetuneError::InputData(format!(
                "'{}' contains no usable rows",
                self.path.display()
            ))
            .into());
        }

        tracing::info!(
            "Loaded {} articles from '{}' ({} skipped)",
            records.len(),
            self.path.display(),
            skipped
        );
        Ok(records)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reads_semicolon_rows() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        fs::write(&path, "Sport;Das Spiel endete 2:1\nKultur;\"Oper; Ballett\"\n").unwrap();

        let records = CsvLoader::new(&path).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new("Sport", "Das Spiel endete 2:1"));
        assert_eq!(records[1].text, "Oper; Ballett");
    }

    #[test]
    fn test_skips_malformed_rows() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        fs::write(&path, "Sport;ok\nbroken-line\nWeb;a;b\nWeb;fine\n").unwrap();

        let records = CsvLoader::new(&path).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].label, "Web");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvLoader::new(dir.path().join("nope.csv")).load_all().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FinetuneError>(),
            Some(FinetuneError::InputData(_))
        ));
    }

    #[test]
    fn test_empty_file_is_input_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        fs::write(&path, "").unwrap();
        assert!(CsvLoader::new(&path).load_all().is_err());
    }
}
