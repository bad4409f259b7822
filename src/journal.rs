//! Append-only CSV log of predictions joined with sentiment

use crate::error::Result;
use crate::types::LogRecord;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PredictionLogger {
    path: PathBuf,
}

impl PredictionLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row. The header is written only when the file is new or
    /// empty; existing rows are never rewritten.
    pub fn append(&self, record: &LogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        info!(
            "Logged {} {} prediction to {}",
            record.symbol,
            record.pred_label,
            self.path.display()
        );
        Ok(())
    }

    /// All rows in append order; a missing log reads as empty
    pub fn read_all(&self) -> Result<Vec<LogRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Last `n` rows in append order
    pub fn tail(&self, n: usize) -> Result<Vec<LogRecord>> {
        let mut records = self.read_all()?;
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
        Ok(records)
    }
}
