use std::{env, fs, process};

use benchlab::{
    BenchError, BenchRunner, RatioSpec, RunnerConfig, aggregate,
    config::{Command, CommandLineConfig, ReportOptions, RunOptions},
    report, summarize,
    workloads::standard_suite,
    write_records,
};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("{}", CommandLineConfig::help());
            process::exit(2);
        }
    };

    let outcome = match config.command {
        Command::Help => {
            println!("{}", CommandLineConfig::help());
            Ok(())
        }
        Command::Run(options) => run(&options),
        Command::Report(options) => run_report(&options),
    };
    if let Err(err) = outcome {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}

fn run(options: &RunOptions) -> Result<(), BenchError> {
    ensure_dir(&options.scratch_dir)?;
    if let Some(parent) = options.output.parent() {
        ensure_dir(parent)?;
    }
    let mut runner = BenchRunner::new(RunnerConfig {
        repeats: options.repeats,
        seed: options.seed,
    })?;
    info!(label = %options.label, repeats = options.repeats, seed = options.seed, "starting benchmark run");
    let mut suite = standard_suite(&options.scratch_dir);
    let records = runner.run_suite(&options.label, &mut suite, |record| {
        println!("{}", record.summary());
    })?;
    drop(suite);
    write_records(&options.output, &records)?;
    info!(path = %options.output.display(), records = records.len(), "records written");
    Ok(())
}

fn run_report(options: &ReportOptions) -> Result<(), BenchError> {
    let table = aggregate(options.inputs.as_slice())?;
    println!("\n=== RAW DATA PREVIEW ===");
    println!("{}", benchlab::ResultTable::from_rows(table.head(5).to_vec()));

    let spec = RatioSpec::new(&options.baseline, &options.comparison);
    let summary = summarize(&table, &spec)?;
    println!("\n=== SUMMARY STATS ===");
    println!("{}", summary.stats);
    println!("\n=== AVERAGE EXECUTION TIMES ===");
    for cell in summary.pivot.long_means() {
        if let Some(mean) = cell.value {
            println!("{:<16}{:<24}{mean:>14.6}", cell.implementation, cell.function);
        }
    }
    println!("\n=== PIVOT TABLE ===");
    print!("{:<24}", "Function");
    for implementation in summary.pivot.implementations() {
        print!("{implementation:>16}");
    }
    println!();
    for row in summary.pivot.rows() {
        print!("{:<24}", row.function);
        for mean in &row.means {
            match mean {
                Some(mean) => print!("{mean:>16.6}"),
                None => print!("{:>16}", "NaN"),
            }
        }
        println!();
    }
    println!("\n=== PERFORMANCE + STABILITY ===");
    println!("{}", summary.pivot);
    for (function, reason) in summary.pivot.undefined_ratios() {
        println!("ratio undefined for {function}: {reason}");
    }

    println!("\n=== OVERALL AVERAGE TIME ===");
    for (implementation, mean) in &summary.overall.means {
        println!("{implementation:<16}{mean:.6}");
    }
    match summary.overall.ratio.value() {
        Some(ratio) => println!(
            "\n{} overall speedup vs {}: {ratio:.2}x (approx)\n",
            spec.comparison, spec.baseline
        ),
        None => println!("\noverall speedup undefined\n"),
    }

    ensure_dir(&options.output_dir)?;
    report(&table, &summary, &options.output_dir)?;
    println!("All charts and summaries saved in: {}", options.output_dir.display());
    Ok(())
}

fn ensure_dir(path: &std::path::Path) -> Result<(), BenchError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| BenchError::io(format!("{}: {e}", path.display())))
}
