use std::{collections::BTreeSet, fmt, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{BenchError, record::BenchmarkRecord};

const IMPLEMENTATION_COLUMNS: &[&str] = &["Implementation", "implementation"];
const FUNCTION_COLUMNS: &[&str] = &["Function", "function"];
const TIME_COLUMNS: &[&str] = &[
    "Mean Time (seconds)",
    "Time (seconds)",
    "time_seconds",
    "mean_time_seconds",
];
const STD_DEV_COLUMNS: &[&str] = &["Std Dev", "StdDev", "std_dev", "std_dev_seconds"];

/// A row in the shared `implementation, function, time_seconds, std_dev` schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub implementation: String,
    pub function: String,
    pub time_seconds: f64,
    pub std_dev: Option<f64>,
}

impl From<BenchmarkRecord> for ResultRow {
    fn from(record: BenchmarkRecord) -> Self {
        Self {
            implementation: record.implementation,
            function: record.function,
            time_seconds: record.mean_time_seconds,
            std_dev: Some(record.std_dev_seconds),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn from_records(records: Vec<BenchmarkRecord>) -> Self {
        Self::from_rows(records.into_iter().map(ResultRow::from).collect())
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[ResultRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn implementations(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.implementation.as_str()))
    }

    pub fn functions(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.function.as_str()))
    }

    pub fn rows_for<'a>(
        &'a self,
        implementation: &'a str,
        function: &'a str,
    ) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.implementation == implementation && r.function == function)
    }

    pub fn times_for(&self, implementation: &str, function: &str) -> Vec<f64> {
        self.rows_for(implementation, function)
            .map(|r| r.time_seconds)
            .collect()
    }

    fn extend(&mut self, other: ResultTable) {
        self.rows.extend(other.rows);
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16}{:<24}{:>16}{:>14}",
            "implementation", "function", "time_seconds", "std_dev"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<16}{:<24}{:>16.6}{:>14}",
                row.implementation,
                row.function,
                row.time_seconds,
                row.std_dev
                    .map(|s| format!("{s:.6}"))
                    .unwrap_or_else(|| "NaN".into())
            )?;
        }
        Ok(())
    }
}

/// Loads every record file and concatenates their rows. Row order within a
/// file is kept; nothing is deduplicated.
pub fn aggregate<P: AsRef<Path>>(paths: &[P]) -> Result<ResultTable, BenchError> {
    let mut table = ResultTable::default();
    for path in paths {
        let loaded = load_table(path.as_ref())?;
        info!(path = %path.as_ref().display(), rows = loaded.len(), "loaded record file");
        table.extend(loaded);
    }
    Ok(table)
}

pub fn load_table(path: &Path) -> Result<ResultTable, BenchError> {
    let fail = |msg: String| BenchError::data_format(format!("{}: {msg}", path.display()));
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| fail(e.to_string()))?;
    let headers = reader.headers().map_err(|e| fail(e.to_string()))?.clone();
    let column = |candidates: &[&str]| {
        locate(&headers, candidates).ok_or_else(|| {
            fail(format!("missing column {}", candidates.first().copied().unwrap_or("?")))
        })
    };
    let columns = Columns {
        implementation: column(IMPLEMENTATION_COLUMNS)?,
        function: column(FUNCTION_COLUMNS)?,
        time: column(TIME_COLUMNS)?,
        std_dev: column(STD_DEV_COLUMNS)?,
    };
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| fail(e.to_string()))?;
        let line = idx + 2;
        let text = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| fail(format!("line {line}: missing {name} field")))
        };
        let time_seconds = parse_seconds(&text(columns.time, "time")?)
            .map_err(|msg| fail(format!("line {line}: time {msg}")))?
            .ok_or_else(|| fail(format!("line {line}: empty time field")))?;
        let std_dev = parse_seconds(&text(columns.std_dev, "std dev")?)
            .map_err(|msg| fail(format!("line {line}: std dev {msg}")))?;
        rows.push(ResultRow {
            implementation: text(columns.implementation, "implementation")?,
            function: text(columns.function, "function")?,
            time_seconds,
            std_dev,
        });
    }
    Ok(ResultTable::from_rows(rows))
}

struct Columns {
    implementation: usize,
    function: usize,
    time: usize,
    std_dev: usize,
}

fn locate(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| candidates.contains(&header))
}

fn parse_seconds(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{raw:?} is not a non-negative duration"));
    }
    Ok(Some(value))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
