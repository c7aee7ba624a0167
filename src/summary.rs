//! Grouped statistics, the per-function pivot and the baseline/comparison
//! speed ratio.

use std::{collections::BTreeMap, fmt};

use ahash::AHashMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::{BenchError, aggregate::ResultTable, stats::{self, Describe}};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RatioSpec {
    pub baseline: String,
    pub comparison: String,
}

impl RatioSpec {
    pub fn new(baseline: &str, comparison: &str) -> Self {
        Self {
            baseline: baseline.to_string(),
            comparison: comparison.to_string(),
        }
    }

    pub fn column_name(&self) -> String {
        format!("Speedup ({} ÷ {})", self.baseline, self.comparison)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedRatio {
    MissingBaseline,
    MissingComparison,
    ZeroComparison,
}

impl fmt::Display for UndefinedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UndefinedRatio::MissingBaseline => "baseline missing",
            UndefinedRatio::MissingComparison => "comparison missing",
            UndefinedRatio::ZeroComparison => "comparison is zero",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Defined(f64),
    Undefined(UndefinedRatio),
}

impl Ratio {
    /// `baseline / comparison`, undefined when either side is absent or the
    /// comparison is zero.
    pub fn between(baseline: Option<f64>, comparison: Option<f64>) -> Self {
        match (baseline, comparison) {
            (None, _) => Ratio::Undefined(UndefinedRatio::MissingBaseline),
            (_, None) => Ratio::Undefined(UndefinedRatio::MissingComparison),
            (Some(_), Some(c)) if c == 0.0 => Ratio::Undefined(UndefinedRatio::ZeroComparison),
            (Some(b), Some(c)) => Ratio::Defined(b / c),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(value) => Some(*value),
            Ratio::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupStat {
    pub implementation: String,
    pub function: String,
    #[serde(flatten)]
    pub describe: Describe,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub groups: Vec<GroupStat>,
}

impl GroupStats {
    pub fn get(&self, implementation: &str, function: &str) -> Option<&GroupStat> {
        self.groups
            .iter()
            .find(|g| g.implementation == implementation && g.function == function)
    }
}

type Cell = (String, String);

/// Mean time per function (rows) and implementation (columns), with the
/// ratio column and per-implementation standard deviations.
#[derive(Clone, Debug)]
pub struct SummaryPivot {
    functions: Vec<String>,
    implementations: Vec<String>,
    means: AHashMap<Cell, f64>,
    std_devs: AHashMap<Cell, f64>,
    spec: RatioSpec,
    ratios: Vec<Ratio>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PivotRow {
    pub function: String,
    pub means: Vec<Option<f64>>,
    pub ratio: Ratio,
    pub std_devs: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LongCell {
    pub function: String,
    pub implementation: String,
    pub value: Option<f64>,
}

impl SummaryPivot {
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    pub fn implementations(&self) -> &[String] {
        &self.implementations
    }

    pub fn spec(&self) -> &RatioSpec {
        &self.spec
    }

    pub fn mean(&self, function: &str, implementation: &str) -> Option<f64> {
        self.means.get(&cell(function, implementation)).copied()
    }

    pub fn std_dev(&self, function: &str, implementation: &str) -> Option<f64> {
        self.std_devs.get(&cell(function, implementation)).copied()
    }

    pub fn ratio(&self, function: &str) -> Option<Ratio> {
        self.functions
            .iter()
            .position(|f| f == function)
            .and_then(|idx| self.ratios.get(idx))
            .copied()
    }

    pub fn ratios(&self) -> impl Iterator<Item = (&str, Ratio)> + '_ {
        self.functions
            .iter()
            .map(String::as_str)
            .zip(self.ratios.iter().copied())
    }

    pub fn undefined_ratios(&self) -> Vec<(&str, UndefinedRatio)> {
        self.ratios()
            .filter_map(|(function, ratio)| match ratio {
                Ratio::Undefined(reason) => Some((function, reason)),
                Ratio::Defined(_) => None,
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<PivotRow> {
        self.ratios()
            .map(|(function, ratio)| PivotRow {
                function: function.to_string(),
                means: self
                    .implementations
                    .iter()
                    .map(|imp| self.mean(function, imp))
                    .collect(),
                ratio,
                std_devs: self
                    .implementations
                    .iter()
                    .map(|imp| self.std_dev(function, imp))
                    .collect(),
            })
            .collect()
    }

    /// Column names in output order: `Function`, one mean column per
    /// implementation, the ratio, then one std-dev column per implementation.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Function".to_string()];
        headers.extend(self.implementations.iter().cloned());
        headers.push(self.spec.column_name());
        headers.extend(
            self.implementations
                .iter()
                .map(|imp| format!("{imp} StdDev")),
        );
        headers
    }

    pub fn long_means(&self) -> Vec<LongCell> {
        self.long(|function, imp| self.mean(function, imp))
    }

    pub fn long_std_devs(&self) -> Vec<LongCell> {
        self.long(|function, imp| self.std_dev(function, imp))
    }

    fn long<F>(&self, value: F) -> Vec<LongCell>
    where
        F: Fn(&str, &str) -> Option<f64>,
    {
        let value = &value;
        self.functions
            .iter()
            .flat_map(move |function| {
                self.implementations.iter().map(move |imp| LongCell {
                    function: function.clone(),
                    implementation: imp.clone(),
                    value: value(function, imp),
                })
            })
            .collect()
    }
}

impl fmt::Display for SummaryPivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for header in self.headers() {
            write!(f, "{header:>22}")?;
        }
        writeln!(f)?;
        for row in self.rows() {
            write!(f, "{:>22}", row.function)?;
            for mean in &row.means {
                write!(f, "{:>22}", display_value(*mean))?;
            }
            write!(f, "{:>22}", display_value(row.ratio.value()))?;
            for std in &row.std_devs {
                write!(f, "{:>22}", display_value(*std))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16}{:<24}{:>6}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
            "implementation", "function", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for group in &self.groups {
            let d = &group.describe;
            writeln!(
                f,
                "{:<16}{:<24}{:>6}{:>12.6}{:>12}{:>12.6}{:>12.6}{:>12.6}{:>12.6}{:>12.6}",
                group.implementation,
                group.function,
                d.count,
                d.mean,
                display_value(d.std),
                d.min,
                d.p25,
                d.p50,
                d.p75,
                d.max
            )?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverallComparison {
    pub means: BTreeMap<String, f64>,
    pub ratio: Ratio,
}

#[derive(Clone, Debug)]
pub struct Summary {
    pub stats: GroupStats,
    pub pivot: SummaryPivot,
    pub overall: OverallComparison,
}

pub fn summarize(table: &ResultTable, spec: &RatioSpec) -> Result<Summary, BenchError> {
    if table.is_empty() {
        return Err(BenchError::invalid_input("no rows to summarize"));
    }
    let functions = table.functions();
    let implementations = table.implementations();

    let mut stats = GroupStats::default();
    let mut means = AHashMap::new();
    let mut std_devs = AHashMap::new();
    for implementation in &implementations {
        for function in &functions {
            let times = table.times_for(implementation, function);
            let Some(describe) = Describe::from_samples(&times) else {
                continue;
            };
            means.insert(cell(function, implementation), describe.mean);
            if let Some(std) = group_std_dev(table, implementation, function, &times) {
                std_devs.insert(cell(function, implementation), std);
            }
            stats.groups.push(GroupStat {
                implementation: implementation.clone(),
                function: function.clone(),
                describe,
            });
        }
    }

    let ratios = functions
        .iter()
        .map(|function| {
            Ratio::between(
                means.get(&cell(function, &spec.baseline)).copied(),
                means.get(&cell(function, &spec.comparison)).copied(),
            )
        })
        .collect::<Vec<_>>();
    for (function, ratio) in functions.iter().zip(&ratios) {
        if let Ratio::Undefined(reason) = ratio {
            warn!(function = %function, %reason, "speed ratio undefined");
        }
    }

    let overall = overall_comparison(table, &implementations, spec);
    info!(
        functions = functions.len(),
        implementations = implementations.len(),
        "summary computed"
    );
    Ok(Summary {
        stats,
        pivot: SummaryPivot {
            functions,
            implementations,
            means,
            std_devs,
            spec: spec.clone(),
            ratios,
        },
        overall,
    })
}

/// Sample std-dev across raw rows; a lone pre-aggregated row keeps the
/// std-dev it was recorded with.
fn group_std_dev(
    table: &ResultTable,
    implementation: &str,
    function: &str,
    times: &[f64],
) -> Option<f64> {
    if times.len() > 1 {
        return stats::sample_std_dev(times);
    }
    table
        .rows_for(implementation, function)
        .next()
        .and_then(|row| row.std_dev)
}

fn overall_comparison(
    table: &ResultTable,
    implementations: &[String],
    spec: &RatioSpec,
) -> OverallComparison {
    let means: BTreeMap<String, f64> = implementations
        .iter()
        .filter_map(|imp| {
            let times: Vec<f64> = table
                .rows()
                .iter()
                .filter(|r| &r.implementation == imp)
                .map(|r| r.time_seconds)
                .collect();
            stats::mean(&times).map(|mean| (imp.clone(), mean))
        })
        .collect();
    let ratio = Ratio::between(
        means.get(&spec.baseline).copied(),
        means.get(&spec.comparison).copied(),
    );
    if let Ratio::Undefined(reason) = ratio {
        warn!(%reason, "overall speed ratio undefined");
    }
    OverallComparison { means, ratio }
}

fn cell(function: &str, implementation: &str) -> Cell {
    (function.to_string(), implementation.to_string())
}

fn display_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.6}"))
        .unwrap_or_else(|| "NaN".to_string())
}
