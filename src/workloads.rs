//! Reference workloads measured for the native implementation.

use std::{
    fs,
    hint::black_box,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use rand::{Rng, rngs::StdRng, seq::SliceRandom};

use crate::{BenchError, runner::Workload};

pub const ARITHMETIC_ITERATIONS: u64 = 10_000_000;
pub const STRING_ITEMS: usize = 100_000;
pub const LIST_ITEMS: usize = 100_000;
pub const FILE_LINES: usize = 100_000;
pub const BRANCH_ITERATIONS: u64 = 10_000_000;

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn arithmetic_operations(n: u64) -> u64 {
    let mut acc = 0u64;
    for i in 0..n {
        acc = acc.wrapping_add(i.wrapping_mul(i) % 7);
        acc ^= i >> 3;
    }
    acc
}

pub fn string_processing(n: usize) -> usize {
    let mut total = 0usize;
    for i in 0..n {
        let item = format!("item-{i}");
        let upper = item.to_uppercase();
        let reversed: String = upper.chars().rev().collect();
        total += reversed.matches('1').count() + reversed.len();
    }
    total
}

pub fn list_manipulation(n: usize, rng: &mut StdRng) -> i64 {
    let mut values: Vec<i64> = (0..n).map(|_| rng.gen_range(0..1_000)).collect();
    values.shuffle(rng);
    values.sort_unstable();
    values
        .iter()
        .filter(|v| *v % 2 == 0)
        .map(|v| v * v)
        .sum()
}

/// Writes `lines` numbered lines to `path`, then reads them back.
pub fn file_io(lines: usize, path: &Path) -> Result<usize, BenchError> {
    let file = fs::File::create(path).map_err(|e| io_failure(path, e))?;
    let mut writer = BufWriter::new(file);
    for i in 0..lines {
        writeln!(writer, "line {i}").map_err(|e| io_failure(path, e))?;
    }
    writer.flush().map_err(|e| io_failure(path, e))?;
    drop(writer);
    let file = fs::File::open(path).map_err(|e| io_failure(path, e))?;
    let mut count = 0usize;
    for line in BufReader::new(file).lines() {
        line.map_err(|e| io_failure(path, e))?;
        count += 1;
    }
    Ok(count)
}

pub fn number_to_name(n: u32) -> &'static str {
    const ONES: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
        "nineteen",
    ];
    if n < 20 {
        return ONES.get(n as usize).copied().unwrap_or("unknown");
    }
    if n == 100 {
        return "one hundred";
    }
    if n > 100 {
        return "unknown";
    }
    match n / 10 {
        2 => "twenties",
        3 => "thirties",
        4 => "forties",
        5 => "fifties",
        6 => "sixties",
        7 => "seventies",
        8 => "eighties",
        _ => "nineties",
    }
}

/// Generates file names that stay distinct across fast successive runs:
/// millisecond timestamp, process id, a process-local counter and a random
/// suffix.
pub fn unique_file_name(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let counter = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix: u32 = rand::random();
    dir.join(format!(
        "{prefix}_{millis}_{}_{counter}_{suffix:08x}{extension}",
        process::id()
    ))
}

pub struct ArithmeticLoop {
    pub iterations: u64,
}

impl Workload for ArithmeticLoop {
    fn name(&self) -> &str {
        "arithmetic_operations"
    }

    fn invoke(&mut self, _rng: &mut StdRng) -> Result<(), BenchError> {
        black_box(arithmetic_operations(black_box(self.iterations)));
        Ok(())
    }
}

pub struct StringProcessing {
    pub items: usize,
}

impl Workload for StringProcessing {
    fn name(&self) -> &str {
        "string_processing"
    }

    fn invoke(&mut self, _rng: &mut StdRng) -> Result<(), BenchError> {
        black_box(string_processing(black_box(self.items)));
        Ok(())
    }
}

pub struct ListManipulation {
    pub items: usize,
}

impl Workload for ListManipulation {
    fn name(&self) -> &str {
        "list_manipulation"
    }

    fn invoke(&mut self, rng: &mut StdRng) -> Result<(), BenchError> {
        black_box(list_manipulation(black_box(self.items), rng));
        Ok(())
    }
}

/// Every repetition rewrites the same file, chosen once per benchmark run.
/// The file is removed when the workload is dropped.
pub struct FileIo {
    pub lines: usize,
    path: PathBuf,
}

impl FileIo {
    pub fn new(lines: usize, scratch_dir: &Path) -> Self {
        Self {
            lines,
            path: unique_file_name(scratch_dir, "rs_output", ".txt"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workload for FileIo {
    fn name(&self) -> &str {
        "file_io"
    }

    fn invoke(&mut self, _rng: &mut StdRng) -> Result<(), BenchError> {
        black_box(file_io(self.lines, &self.path)?);
        Ok(())
    }
}

impl Drop for FileIo {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub struct BranchLookup {
    pub iterations: u64,
}

impl Workload for BranchLookup {
    fn name(&self) -> &str {
        "number_to_name"
    }

    fn invoke(&mut self, _rng: &mut StdRng) -> Result<(), BenchError> {
        for i in 0..self.iterations {
            black_box(number_to_name(black_box((i % 101) as u32)));
        }
        Ok(())
    }
}

/// The five reference workloads in their fixed measurement order.
pub fn standard_suite(scratch_dir: &Path) -> Vec<Box<dyn Workload>> {
    vec![
        Box::new(ArithmeticLoop {
            iterations: ARITHMETIC_ITERATIONS,
        }),
        Box::new(StringProcessing {
            items: STRING_ITEMS,
        }),
        Box::new(ListManipulation { items: LIST_ITEMS }),
        Box::new(FileIo::new(FILE_LINES, scratch_dir)),
        Box::new(BranchLookup {
            iterations: BRANCH_ITERATIONS,
        }),
    ]
}

fn io_failure(path: &Path, err: std::io::Error) -> BenchError {
    BenchError::workload(format!("{}: {err}", path.display()))
}
