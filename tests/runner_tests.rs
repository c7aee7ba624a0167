use std::{collections::VecDeque, time::Duration};

use benchlab::{
    BenchError, BenchRunner, Clock, RunnerConfig, Workload, runner::MonotonicClock, workload,
};
use rand::{Rng, rngs::StdRng};

struct ScriptedClock {
    durations: VecDeque<Duration>,
    starts: usize,
}

impl ScriptedClock {
    fn new(millis: &[u64]) -> Self {
        Self {
            durations: millis.iter().map(|ms| Duration::from_millis(*ms)).collect(),
            starts: 0,
        }
    }
}

impl Clock for ScriptedClock {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn elapsed(&mut self) -> Duration {
        self.durations.pop_front().unwrap_or_default()
    }
}

struct Counter {
    calls: usize,
    fail_on: Option<usize>,
}

impl Workload for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn invoke(&mut self, _rng: &mut StdRng) -> Result<(), BenchError> {
        self.calls += 1;
        if Some(self.calls) == self.fail_on {
            return Err(BenchError::workload("boom"));
        }
        Ok(())
    }
}

fn config(repeats: usize) -> RunnerConfig {
    RunnerConfig { repeats, seed: 42 }
}

#[test]
fn test_run_performs_warm_up_plus_timed_calls() {
    for n in [1usize, 5, 20] {
        let mut runner = BenchRunner::with_clock(config(n), ScriptedClock::new(&[])).unwrap();
        let mut counter = Counter {
            calls: 0,
            fail_on: None,
        };
        runner.run("Rust", &mut counter).unwrap();
        assert_eq!(counter.calls, n + 1);
    }
}

#[test]
fn test_warm_up_call_is_not_timed() {
    let mut clock_runner =
        BenchRunner::with_clock(config(3), ScriptedClock::new(&[10, 10, 10])).unwrap();
    let mut counter = Counter {
        calls: 0,
        fail_on: None,
    };
    let record = clock_runner.run("Rust", &mut counter).unwrap();
    assert_eq!(counter.calls, 4);
    assert!((record.mean_time_seconds - 0.010).abs() < 1e-12);
}

#[test]
fn test_mean_and_population_std_dev_from_injected_samples() {
    let mut runner =
        BenchRunner::with_clock(config(4), ScriptedClock::new(&[1, 2, 3, 4])).unwrap();
    let mut counter = Counter {
        calls: 0,
        fail_on: None,
    };
    let record = runner.run("Rust", &mut counter).unwrap();
    assert_eq!(record.implementation, "Rust");
    assert_eq!(record.function, "counter");
    assert!((record.mean_time_seconds - 0.0025).abs() < 1e-12);
    let expected_std = 1.25f64.sqrt() / 1000.0;
    assert!((record.std_dev_seconds - expected_std).abs() < 1e-12);
}

#[test]
fn test_zero_repeats_fails_before_any_call() {
    assert!(matches!(
        BenchRunner::new(config(0)),
        Err(BenchError::InvalidInput(_))
    ));

    let mut runner = BenchRunner::with_clock(config(3), ScriptedClock::new(&[])).unwrap();
    let mut counter = Counter {
        calls: 0,
        fail_on: None,
    };
    let err = runner.run_with_repeats("Rust", &mut counter, 0).unwrap_err();
    assert!(matches!(err, BenchError::InvalidInput(_)));
    assert_eq!(counter.calls, 0);
}

#[test]
fn test_warm_up_failure_propagates() {
    let mut runner = BenchRunner::with_clock(config(5), ScriptedClock::new(&[])).unwrap();
    let mut counter = Counter {
        calls: 0,
        fail_on: Some(1),
    };
    let err = runner.run("Rust", &mut counter).unwrap_err();
    assert!(matches!(err, BenchError::Workload(ref msg) if msg.contains("warm-up")));
    assert_eq!(counter.calls, 1);
}

#[test]
fn test_timed_failure_aborts_without_record() {
    let mut runner = BenchRunner::with_clock(config(5), ScriptedClock::new(&[])).unwrap();
    let mut counter = Counter {
        calls: 0,
        fail_on: Some(3),
    };
    let err = runner.run("Rust", &mut counter).unwrap_err();
    assert!(matches!(err, BenchError::Workload(ref msg) if msg.contains("repetition")));
    assert_eq!(counter.calls, 3);
}

#[test]
fn test_same_seed_gives_identical_random_inputs() {
    let draws = |seed: u64| {
        let mut seen = Vec::new();
        let mut runner = BenchRunner::new(RunnerConfig { repeats: 3, seed }).unwrap();
        let mut sampler = workload("sampler", |rng: &mut StdRng| {
            seen.push(rng.gen_range(0..1_000_000u32));
            Ok(())
        });
        runner.run("Rust", &mut sampler).unwrap();
        drop(sampler);
        seen
    };
    assert_eq!(draws(42), draws(42));
    assert_eq!(draws(42).len(), 4);
    assert_ne!(draws(42), draws(7));
}

#[test]
fn test_run_suite_preserves_order_and_reports_each_record() {
    let mut runner = BenchRunner::with_clock(config(2), MonotonicClock::default()).unwrap();
    let mut suite: Vec<Box<dyn Workload>> = vec![
        Box::new(workload("first", |_: &mut StdRng| Ok(()))),
        Box::new(workload("second", |_: &mut StdRng| Ok(()))),
        Box::new(workload("third", |_: &mut StdRng| Ok(()))),
    ];
    let mut reported = Vec::new();
    let records = runner
        .run_suite("Rust", &mut suite, |record| reported.push(record.function.clone()))
        .unwrap();
    let names: Vec<_> = records.iter().map(|r| r.function.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);
    assert_eq!(reported, ["first", "second", "third"]);
    assert!(records.iter().all(|r| r.mean_time_seconds >= 0.0 && r.std_dev_seconds >= 0.0));
}

#[test]
fn test_run_suite_stops_at_first_failure() {
    let mut runner = BenchRunner::with_clock(config(2), ScriptedClock::new(&[])).unwrap();
    let mut suite: Vec<Box<dyn Workload>> = vec![
        Box::new(workload("ok", |_: &mut StdRng| Ok(()))),
        Box::new(workload("broken", |_: &mut StdRng| {
            Err(BenchError::workload("no input"))
        })),
        Box::new(workload("never", |_: &mut StdRng| Ok(()))),
    ];
    let mut reported = 0;
    let result = runner.run_suite("Rust", &mut suite, |_| reported += 1);
    assert!(result.is_err());
    assert_eq!(reported, 1);
}

#[test]
fn test_run_suite_rejects_duplicate_function_names() {
    let mut runner = BenchRunner::with_clock(config(2), ScriptedClock::new(&[])).unwrap();
    let calls = std::rc::Rc::new(std::cell::Cell::new(0usize));
    let (first, second) = (calls.clone(), calls.clone());
    let mut suite: Vec<Box<dyn Workload>> = vec![
        Box::new(workload("f", move |_: &mut StdRng| {
            first.set(first.get() + 1);
            Ok(())
        })),
        Box::new(workload("f", move |_: &mut StdRng| {
            second.set(second.get() + 1);
            Ok(())
        })),
    ];
    let mut reported = 0;
    let err = runner
        .run_suite("Rust", &mut suite, |_| reported += 1)
        .unwrap_err();
    assert!(matches!(err, BenchError::InvalidInput(ref msg) if msg.contains("duplicate workload f")));
    assert_eq!(reported, 0);
    assert_eq!(calls.get(), 0);
}
