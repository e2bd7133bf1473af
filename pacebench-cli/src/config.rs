//! Harness configuration: command-line flags layered over `pacebench.toml`.
//!
//! A `pacebench.toml` in the project root (discovered by walking up from the
//! current directory) supplies defaults; explicit flags override it; anything
//! still unset falls back to the built-in defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Default minimum per-trial runtime in seconds.
pub const DEFAULT_MIN_TIME: f64 = 0.5;
/// Default number of repetitions per benchmark.
pub const DEFAULT_REPETITIONS: usize = 1;

/// Command-line flags of a benchmark binary.
#[derive(Parser, Debug, Default)]
#[command(name = "pacebench", about = "pacebench - adaptive microbenchmark harness")]
pub struct Cli {
    /// Regex selecting which benchmarks to run; empty or "all" runs everything
    #[arg(long, default_value = ".")]
    pub filter: String,

    /// Print the matched benchmark names without running them
    #[arg(long)]
    pub list: bool,

    /// Minimum seconds a trial must run before it is considered significant
    #[arg(long)]
    pub min_time: Option<f64>,

    /// Number of repetitions of each benchmark; aggregates are reported when > 1
    #[arg(long)]
    pub repetitions: Option<usize>,

    /// Report only aggregate rows, in every reporter
    #[arg(long)]
    pub report_aggregates_only: Option<bool>,

    /// Report only aggregate rows, in the display reporter alone
    #[arg(long)]
    pub display_aggregates_only: Option<bool>,

    /// Display format: console, json, or csv (default console)
    #[arg(long)]
    pub format: Option<String>,

    /// Write an additional report to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Format of the file report: console, json, or csv (default json)
    #[arg(long)]
    pub out_format: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// `pacebench.toml` contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub runner: RunnerSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSection {
    /// Minimum per-trial runtime in seconds.
    pub min_time: Option<f64>,
    pub repetitions: Option<usize>,
    pub report_aggregates_only: Option<bool>,
    pub display_aggregates_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    /// Display format name.
    pub format: Option<String>,
    /// File report path.
    pub file: Option<PathBuf>,
    /// File report format name.
    pub file_format: Option<String>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Walk up from the current directory looking for `pacebench.toml`.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join("pacebench.toml");
            if candidate.exists() {
                return Self::load(&candidate).ok();
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// The resolved global knobs the runner reads as constants during a run.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Default minimum trial duration; per-benchmark `min_time` overrides it.
    pub min_time: f64,
    /// Default repetition count; per-benchmark `repetitions` overrides it.
    pub repetitions: usize,
    /// Suppress non-aggregate rows in both reporters.
    pub report_aggregates_only: bool,
    /// Suppress non-aggregate rows only in the display reporter.
    pub display_aggregates_only: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            min_time: DEFAULT_MIN_TIME,
            repetitions: DEFAULT_REPETITIONS,
            report_aggregates_only: false,
            display_aggregates_only: false,
        }
    }
}

impl HarnessOptions {
    /// Flags win over the config file; the built-in defaults fill the rest.
    pub fn resolve(file: &FileConfig, cli: &Cli) -> Self {
        Self {
            min_time: cli
                .min_time
                .or(file.runner.min_time)
                .unwrap_or(DEFAULT_MIN_TIME),
            repetitions: cli
                .repetitions
                .or(file.runner.repetitions)
                .unwrap_or(DEFAULT_REPETITIONS),
            report_aggregates_only: cli
                .report_aggregates_only
                .or(file.runner.report_aggregates_only)
                .unwrap_or(false),
            display_aggregates_only: cli
                .display_aggregates_only
                .or(file.runner.display_aggregates_only)
                .unwrap_or(false),
        }
    }
}

/// Reporter formats the harness can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
}

#[derive(Debug, Error)]
#[error("unknown output format '{0}' (expected console, json, or csv)")]
pub struct UnknownFormat(String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}
