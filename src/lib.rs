//! Micro-benchmark harness: times workloads, persists one CSV record per
//! `(implementation, function)` pair, then merges record files from
//! independent runs into summary tables and comparison charts.

pub mod aggregate;
pub mod atomic;
pub mod chart;
pub mod config;
pub mod errors;
pub mod record;
pub mod report;
pub mod runner;
pub mod stats;
pub mod summary;
pub mod workloads;

pub use crate::aggregate::{ResultRow, ResultTable, aggregate};
pub use crate::errors::BenchError;
pub use crate::record::{BenchmarkRecord, read_records, write_records};
pub use crate::report::report;
pub use crate::runner::{BenchRunner, Clock, RunnerConfig, Workload, workload};
pub use crate::summary::{Ratio, RatioSpec, Summary, SummaryPivot, UndefinedRatio, summarize};
