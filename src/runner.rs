//! Timing harness: one untimed warm-up call followed by `repeats` individually
//! timed calls, summarized into a [`BenchmarkRecord`].

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{BenchError, record::BenchmarkRecord, stats};

pub const DEFAULT_REPEATS: usize = 20;
pub const DEFAULT_SEED: u64 = 42;

/// Anything that can be invoked repeatedly with fixed arguments.
///
/// Arguments are captured by the implementor; the runner only supplies the
/// process-wide random source so every implementation sees the same
/// pseudo-random sequence.
pub trait Workload {
    fn name(&self) -> &str;
    fn invoke(&mut self, rng: &mut StdRng) -> Result<(), BenchError>;
}

pub struct FnWorkload<F> {
    name: String,
    func: F,
}

impl<F> Workload for FnWorkload<F>
where
    F: FnMut(&mut StdRng) -> Result<(), BenchError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&mut self, rng: &mut StdRng) -> Result<(), BenchError> {
        (self.func)(rng)
    }
}

pub fn workload<F>(name: &str, func: F) -> FnWorkload<F>
where
    F: FnMut(&mut StdRng) -> Result<(), BenchError>,
{
    FnWorkload {
        name: name.to_string(),
        func,
    }
}

/// Measures a single timed interval.
pub trait Clock {
    fn start(&mut self);
    fn elapsed(&mut self) -> Duration;
}

#[derive(Clone, Debug, Default)]
pub struct MonotonicClock {
    started: Option<Instant>,
}

impl Clock for MonotonicClock {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn elapsed(&mut self) -> Duration {
        self.started
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    pub repeats: usize,
    pub seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            repeats: DEFAULT_REPEATS,
            seed: DEFAULT_SEED,
        }
    }
}

pub struct BenchRunner<C = MonotonicClock> {
    repeats: usize,
    clock: C,
    rng: StdRng,
}

impl BenchRunner<MonotonicClock> {
    pub fn new(config: RunnerConfig) -> Result<Self, BenchError> {
        Self::with_clock(config, MonotonicClock::default())
    }
}

impl<C: Clock> BenchRunner<C> {
    /// Seeds the random source once; it is never reseeded afterwards.
    pub fn with_clock(config: RunnerConfig, clock: C) -> Result<Self, BenchError> {
        check_repeats(config.repeats)?;
        Ok(Self {
            repeats: config.repeats,
            clock,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn run(
        &mut self,
        implementation: &str,
        workload: &mut dyn Workload,
    ) -> Result<BenchmarkRecord, BenchError> {
        self.run_with_repeats(implementation, workload, self.repeats)
    }

    pub fn run_with_repeats(
        &mut self,
        implementation: &str,
        workload: &mut dyn Workload,
        repeats: usize,
    ) -> Result<BenchmarkRecord, BenchError> {
        let samples = self.sample(workload, repeats)?;
        let mean_time_seconds = stats::mean(&samples)
            .ok_or_else(|| BenchError::invalid_input("no samples collected"))?;
        let std_dev_seconds = stats::population_std_dev(&samples)
            .ok_or_else(|| BenchError::invalid_input("no samples collected"))?;
        debug!(
            implementation,
            function = workload.name(),
            repeats,
            mean_time_seconds,
            std_dev_seconds,
            "benchmark complete"
        );
        Ok(BenchmarkRecord {
            implementation: implementation.to_string(),
            function: workload.name().to_string(),
            mean_time_seconds,
            std_dev_seconds,
        })
    }

    /// Runs each workload in order, handing every record to `on_record` as
    /// soon as it is measured. Workload names must be unique; the first
    /// failure aborts the suite.
    pub fn run_suite<F>(
        &mut self,
        implementation: &str,
        workloads: &mut [Box<dyn Workload>],
        mut on_record: F,
    ) -> Result<Vec<BenchmarkRecord>, BenchError>
    where
        F: FnMut(&BenchmarkRecord),
    {
        let mut seen = HashSet::with_capacity(workloads.len());
        for workload in workloads.iter() {
            if !seen.insert(workload.name()) {
                return Err(BenchError::invalid_input(format!(
                    "duplicate workload {}",
                    workload.name()
                )));
            }
        }
        let mut records = Vec::with_capacity(workloads.len());
        for workload in workloads.iter_mut() {
            let record = self.run(implementation, workload.as_mut())?;
            on_record(&record);
            records.push(record);
        }
        Ok(records)
    }

    fn sample(
        &mut self,
        workload: &mut dyn Workload,
        repeats: usize,
    ) -> Result<Vec<f64>, BenchError> {
        check_repeats(repeats)?;
        workload
            .invoke(&mut self.rng)
            .map_err(|e| wrap_failure(workload.name(), "warm-up", e))?;
        let mut samples = Vec::with_capacity(repeats);
        for repetition in 0..repeats {
            self.clock.start();
            let outcome = workload.invoke(&mut self.rng);
            let elapsed = self.clock.elapsed();
            outcome.map_err(|e| {
                wrap_failure(workload.name(), &format!("repetition {repetition}"), e)
            })?;
            samples.push(elapsed.as_secs_f64());
        }
        Ok(samples)
    }
}

fn check_repeats(repeats: usize) -> Result<(), BenchError> {
    if repeats == 0 {
        return Err(BenchError::invalid_input("repeats must be positive"));
    }
    Ok(())
}

fn wrap_failure(name: &str, phase: &str, err: BenchError) -> BenchError {
    match err {
        BenchError::Workload(msg) => BenchError::workload(format!("{name} ({phase}): {msg}")),
        other => BenchError::workload(format!("{name} ({phase}): {other}")),
    }
}
