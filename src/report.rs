use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::{
    BenchError,
    aggregate::ResultTable,
    atomic::write_atomic,
    chart::{self, ChartTheme},
    summary::{GroupStats, OverallComparison, PivotRow, Summary, SummaryPivot},
};

pub const SUMMARY_FILE: &str = "summary_results.csv";
pub const STATISTICS_FILE: &str = "detailed_statistics.csv";
pub const SUMMARY_JSON_FILE: &str = "summary.json";

const STATISTICS_HEADER: [&str; 10] = [
    "Implementation",
    "Function",
    "count",
    "mean",
    "std",
    "min",
    "25%",
    "50%",
    "75%",
    "max",
];

#[derive(Serialize)]
struct SummaryDocument<'a> {
    baseline: &'a str,
    comparison: &'a str,
    implementations: &'a [String],
    rows: Vec<PivotRow>,
    statistics: &'a GroupStats,
    overall: &'a OverallComparison,
}

pub fn report(
    table: &ResultTable,
    summary: &Summary,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, BenchError> {
    report_with_theme(table, summary, output_dir, &ChartTheme::default())
}

/// Writes the summary tables and the four charts into `output_dir`, which
/// must already exist. Every artifact is produced in memory before the first
/// file is written.
pub fn report_with_theme(
    table: &ResultTable,
    summary: &Summary,
    output_dir: &Path,
    theme: &ChartTheme,
) -> Result<Vec<PathBuf>, BenchError> {
    if !output_dir.is_dir() {
        return Err(BenchError::io(format!(
            "output directory {} does not exist",
            output_dir.display()
        )));
    }
    let artifacts: Vec<(&str, Vec<u8>)> = vec![
        (SUMMARY_FILE, encode_summary(&summary.pivot)?),
        (STATISTICS_FILE, encode_statistics(&summary.stats)?),
        (SUMMARY_JSON_FILE, encode_json(summary)?),
        (
            chart::AVERAGE_TIME_CHART,
            chart::average_time_chart(&summary.pivot, theme)?.into_bytes(),
        ),
        (
            chart::DISTRIBUTION_CHART,
            chart::distribution_chart(table, theme)?.into_bytes(),
        ),
        (
            chart::RATIO_HEATMAP,
            chart::ratio_heatmap(&summary.pivot, theme)?.into_bytes(),
        ),
        (
            chart::STABILITY_CHART,
            chart::stability_chart(&summary.pivot, theme)?.into_bytes(),
        ),
    ];
    let mut written = Vec::with_capacity(artifacts.len());
    for (name, data) in artifacts {
        let path = output_dir.join(name);
        write_atomic(&path, &data)?;
        written.push(path);
    }
    info!(dir = %output_dir.display(), artifacts = written.len(), "report written");
    Ok(written)
}

pub fn encode_summary(pivot: &SummaryPivot) -> Result<Vec<u8>, BenchError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(pivot.headers())
        .map_err(|e| BenchError::io(e.to_string()))?;
    for row in pivot.rows() {
        let mut fields = vec![row.function.clone()];
        fields.extend(row.means.iter().map(|v| csv_value(*v)));
        fields.push(csv_value(row.ratio.value()));
        fields.extend(row.std_devs.iter().map(|v| csv_value(*v)));
        writer
            .write_record(&fields)
            .map_err(|e| BenchError::io(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| BenchError::io(e.to_string()))
}

pub fn encode_statistics(stats: &GroupStats) -> Result<Vec<u8>, BenchError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(STATISTICS_HEADER)
        .map_err(|e| BenchError::io(e.to_string()))?;
    for group in &stats.groups {
        let d = &group.describe;
        writer
            .write_record([
                group.implementation.clone(),
                group.function.clone(),
                d.count.to_string(),
                d.mean.to_string(),
                csv_value(d.std),
                d.min.to_string(),
                d.p25.to_string(),
                d.p50.to_string(),
                d.p75.to_string(),
                d.max.to_string(),
            ])
            .map_err(|e| BenchError::io(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| BenchError::io(e.to_string()))
}

fn encode_json(summary: &Summary) -> Result<Vec<u8>, BenchError> {
    let document = SummaryDocument {
        baseline: &summary.pivot.spec().baseline,
        comparison: &summary.pivot.spec().comparison,
        implementations: summary.pivot.implementations(),
        rows: summary.pivot.rows(),
        statistics: &summary.stats,
        overall: &summary.overall,
    };
    serde_json::to_vec_pretty(&document).map_err(|e| BenchError::io(e.to_string()))
}

/// Missing values are written as empty fields.
fn csv_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
