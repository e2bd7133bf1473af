//! Pacebench CLI - Harness Driver
//!
//! Wires a flat list of [`Benchmark`] definitions (supplied by whatever
//! discovery layer the binary uses) to the iteration controller and the
//! reporters. Use [`run`] from a benchmark binary's `main`:
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     let benchmarks = vec![/* Benchmark definitions */];
//!     pacebench_cli::run(benchmarks)?;
//!     Ok(())
//! }
//! ```

mod config;
mod runner;

pub use config::{Cli, FileConfig, HarnessOptions, OutputFormat, DEFAULT_MIN_TIME, DEFAULT_REPETITIONS};
pub use runner::{run_benchmark, RunResults};

use std::io::Write;

use anyhow::Context as _;
use clap::Parser;
use regex::Regex;

use pacebench_core::Benchmark;
use pacebench_report::{ConsoleReporter, Context, CsvReporter, JsonReporter, Reporter, Run};

/// Parse flags, resolve configuration, and run every matching benchmark.
/// Returns the number of benchmarks that matched the filter.
pub fn run(benchmarks: Vec<Benchmark>) -> anyhow::Result<usize> {
    let cli = Cli::parse();
    run_with_cli(benchmarks, cli)
}

/// [`run`] with pre-parsed flags; the entry point for tests and custom mains.
pub fn run_with_cli(mut benchmarks: Vec<Benchmark>, cli: Cli) -> anyhow::Result<usize> {
    init_logging(cli.verbose);

    let file_config = FileConfig::discover().unwrap_or_default();
    let options = HarnessOptions::resolve(&file_config, &cli);

    let pattern = match cli.filter.as_str() {
        "" | "all" => ".",
        other => other,
    };
    let filter =
        Regex::new(pattern).with_context(|| format!("invalid benchmark filter '{pattern}'"))?;
    benchmarks.retain(|benchmark| filter.is_match(&benchmark.name));

    if benchmarks.is_empty() {
        eprintln!("Failed to match any benchmarks against filter: {pattern}");
        return Ok(0);
    }

    if cli.list {
        let mut out = std::io::stdout();
        for benchmark in &benchmarks {
            let _ = writeln!(out, "{}", benchmark.name);
        }
        return Ok(benchmarks.len());
    }

    let display_format: OutputFormat = cli
        .format
        .as_deref()
        .or(file_config.output.format.as_deref())
        .unwrap_or("console")
        .parse()?;
    let mut display = make_reporter(display_format, Box::new(std::io::stdout()));

    let out_path = cli.out.clone().or(file_config.output.file);
    let mut file = match out_path {
        Some(path) => {
            let format: OutputFormat = cli
                .out_format
                .as_deref()
                .or(file_config.output.file_format.as_deref())
                .unwrap_or("json")
                .parse()?;
            let handle = std::fs::File::create(&path)
                .with_context(|| format!("cannot open output file '{}'", path.display()))?;
            Some(make_reporter(format, Box::new(handle)))
        }
        None => None,
    };

    let file_reporter: Option<&mut dyn Reporter> = match &mut file {
        Some(reporter) => Some(reporter.as_mut()),
        None => None,
    };
    run_benchmarks(&benchmarks, &options, display.as_mut(), file_reporter);
    Ok(benchmarks.len())
}

/// Drive every benchmark through the repetition driver and hand the results
/// to the reporters.
///
/// Both reporters see the same records; each independently suppresses
/// non-aggregate rows when its aggregates-only flag is resolved for the
/// benchmark. Streams are flushed after every emission so output stays
/// timely even when block-buffered.
pub fn run_benchmarks(
    benchmarks: &[Benchmark],
    options: &HarnessOptions,
    display: &mut dyn Reporter,
    mut file: Option<&mut dyn Reporter>,
) {
    let context = Context::new(executable_name(), name_field_width(benchmarks, options));

    // Runs of one complexity family, accumulated across benchmarks until the
    // member marked last_in_family closes it.
    let mut complexity_reports: Vec<Run> = Vec::new();

    let context_accepted = display.report_context(&context)
        && file
            .as_deref_mut()
            .map_or(true, |reporter| reporter.report_context(&context));
    if context_accepted {
        display.flush();
        if let Some(reporter) = file.as_deref_mut() {
            reporter.flush();
        }

        for benchmark in benchmarks {
            let results = run_benchmark(benchmark, options, &mut complexity_reports);

            emit(display, &results, results.display_report_aggregates_only);
            if let Some(reporter) = file.as_deref_mut() {
                emit(reporter, &results, results.file_report_aggregates_only);
            }
        }
    }

    display.finalize();
    display.flush();
    if let Some(reporter) = file.as_deref_mut() {
        reporter.finalize();
        reporter.flush();
    }
}

fn emit(reporter: &mut dyn Reporter, results: &RunResults, aggregates_only: bool) {
    if !aggregates_only {
        reporter.report_runs(&results.non_aggregates);
    }
    if !results.aggregates_only.is_empty() {
        reporter.report_runs(&results.aggregates_only);
    }
    reporter.flush();
}

/// Width of the name column: at least 10, wide enough for the longest name,
/// plus room for the `_<statistic>` suffix when repetitions are in play.
fn name_field_width(benchmarks: &[Benchmark], options: &HarnessOptions) -> usize {
    let mut has_repetitions = options.repetitions > 1;
    let mut name_width = 10usize;
    let mut stat_width = 0usize;
    for benchmark in benchmarks {
        name_width = name_width.max(benchmark.name.len());
        has_repetitions |= benchmark.repetitions > 1;
        for statistic in &benchmark.statistics {
            stat_width = stat_width.max(statistic.name.len());
        }
    }
    if has_repetitions {
        name_width += 1 + stat_width;
    }
    name_width
}

fn executable_name() -> String {
    std::env::args().next().unwrap_or_else(|| "unknown".to_string())
}

fn make_reporter(format: OutputFormat, out: Box<dyn Write + Send>) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
        OutputFormat::Csv => Box::new(CsvReporter::new(out)),
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "pacebench=info",
        1 => "pacebench=debug",
        _ => "pacebench=trace",
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
