use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BenchError, atomic::write_atomic};

pub const RECORD_HEADER: [&str; 4] = ["Implementation", "Function", "Mean Time (seconds)", "Std Dev"];

/// One persisted `(implementation, function, mean, stddev)` measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "Implementation")]
    pub implementation: String,
    #[serde(rename = "Function")]
    pub function: String,
    #[serde(rename = "Mean Time (seconds)")]
    pub mean_time_seconds: f64,
    #[serde(rename = "Std Dev")]
    pub std_dev_seconds: f64,
}

impl BenchmarkRecord {
    pub fn summary(&self) -> String {
        format!(
            "{} done in: {:.4} s (stddev {:.4})",
            self.function, self.mean_time_seconds, self.std_dev_seconds
        )
    }
}

/// Serializes `records` to CSV, replacing any file already at `path`.
pub fn write_records(path: &Path, records: &[BenchmarkRecord]) -> Result<(), BenchError> {
    let data = encode_records(records)?;
    write_atomic(path, &data)
}

pub fn encode_records(records: &[BenchmarkRecord]) -> Result<Vec<u8>, BenchError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(RECORD_HEADER)
        .map_err(|e| BenchError::io(e.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| BenchError::io(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| BenchError::io(e.to_string()))
}

pub fn read_records(path: &Path) -> Result<Vec<BenchmarkRecord>, BenchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| BenchError::data_format(format!("{}: {e}", path.display())))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| BenchError::data_format(format!("{}: {e}", path.display()))))
        .collect()
}
