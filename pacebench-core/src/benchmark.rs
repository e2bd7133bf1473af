//! Benchmark definitions as handed to the harness by a discovery layer.

use std::fmt;
use std::sync::Arc;

use crate::bencher::Bencher;
use crate::statistics::{default_statistics, Statistic, StatisticsFunc};

/// The benchmark body. Receives the per-worker run state and must drive its
/// `keep_running` loop to completion.
pub type BenchmarkFn = Arc<dyn Fn(&mut Bencher) + Send + Sync + 'static>;

/// Curve for a user-provided complexity lambda.
pub type BigOFunc = fn(i64) -> f64;

/// Display unit for reported times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl TimeUnit {
    /// Factor converting seconds into this unit.
    pub fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Nanosecond => 1e9,
            TimeUnit::Microsecond => 1e6,
            TimeUnit::Millisecond => 1e3,
            TimeUnit::Second => 1.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanosecond => "ns",
            TimeUnit::Microsecond => "us",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
        }
    }
}

/// Asymptotic complexity reported for a benchmark family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BigO {
    /// No complexity report.
    #[default]
    None,
    O1,
    OLogN,
    ON,
    ONLogN,
    ON2,
    ON3,
    /// Fit all known curves and report the best one.
    Auto,
    /// Fit the user-supplied lambda.
    Lambda,
}

impl BigO {
    /// Human notation used by reporters, e.g. `N^2`.
    pub fn notation(self) -> &'static str {
        match self {
            BigO::None => "",
            BigO::O1 => "(1)",
            BigO::OLogN => "lgN",
            BigO::ON => "N",
            BigO::ONLogN => "NlgN",
            BigO::ON2 => "N^2",
            BigO::ON3 => "N^3",
            BigO::Auto => "",
            BigO::Lambda => "f(N)",
        }
    }
}

/// Which reporters should see only aggregate rows for this benchmark.
/// `Unspecified` defers to the global flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationReport {
    #[default]
    Unspecified,
    DisplayOnly,
    FileOnly,
    Both,
}

impl AggregationReport {
    pub fn display_aggregates_only(self) -> bool {
        matches!(self, AggregationReport::DisplayOnly | AggregationReport::Both)
    }

    pub fn file_aggregates_only(self) -> bool {
        matches!(self, AggregationReport::FileOnly | AggregationReport::Both)
    }
}

/// One runnable parameterization of a benchmark: a body plus the argument
/// tuple, thread count, and measurement policy it runs under.
///
/// Zero means "unset" for `iterations`, `repetitions`, and `min_time`; the
/// runner substitutes its global defaults.
#[derive(Clone)]
pub struct Benchmark {
    pub name: String,
    pub body: BenchmarkFn,
    pub args: Vec<i64>,
    pub threads: usize,
    /// Explicit per-trial iteration count; 0 selects the adaptive controller.
    pub iterations: u64,
    pub repetitions: usize,
    pub min_time: f64,
    pub use_real_time: bool,
    pub use_manual_time: bool,
    pub time_unit: TimeUnit,
    pub complexity: BigO,
    pub complexity_lambda: Option<BigOFunc>,
    pub statistics: Vec<Statistic>,
    pub aggregation_report: AggregationReport,
    /// True on the final member of a complexity family; triggers the big-O
    /// fit over every member collected so far.
    pub last_in_family: bool,
}

impl Benchmark {
    pub fn new(name: impl Into<String>, body: impl Fn(&mut Bencher) + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body),
            args: Vec::new(),
            threads: 1,
            iterations: 0,
            repetitions: 0,
            min_time: 0.0,
            use_real_time: false,
            use_manual_time: false,
            time_unit: TimeUnit::default(),
            complexity: BigO::None,
            complexity_lambda: None,
            statistics: default_statistics(),
            aggregation_report: AggregationReport::Unspecified,
            last_in_family: false,
        }
    }

    pub fn arg(mut self, arg: i64) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(mut self, args: &[i64]) -> Self {
        self.args.extend_from_slice(args);
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        assert!(threads >= 1, "thread count must be at least 1");
        self.threads = threads;
        self
    }

    /// Pin the trial to exactly `iterations`, bypassing the adaptive
    /// controller.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn min_time(mut self, seconds: f64) -> Self {
        assert!(seconds >= 0.0, "min_time must be non-negative");
        self.min_time = seconds;
        self
    }

    /// Base the should-report decision on elapsed wall time instead of CPU
    /// time. Mutually exclusive with manual time.
    pub fn use_real_time(mut self) -> Self {
        assert!(!self.use_manual_time, "cannot combine real time with manual time");
        self.use_real_time = true;
        self
    }

    /// Base the should-report decision on times the body reports via
    /// `set_iteration_time`. Mutually exclusive with real time.
    pub fn use_manual_time(mut self) -> Self {
        assert!(!self.use_real_time, "cannot combine manual time with real time");
        self.use_manual_time = true;
        self
    }

    pub fn time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn complexity(mut self, complexity: BigO) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn complexity_lambda(mut self, lambda: BigOFunc) -> Self {
        self.complexity = BigO::Lambda;
        self.complexity_lambda = Some(lambda);
        self
    }

    /// Add an aggregate beyond the default mean/median/stddev.
    pub fn statistic(mut self, name: impl Into<String>, compute: StatisticsFunc) -> Self {
        self.statistics.push(Statistic::new(name, compute));
        self
    }

    pub fn aggregation_report(mut self, mode: AggregationReport) -> Self {
        self.aggregation_report = mode;
        self
    }

    pub fn last_in_family(mut self) -> Self {
        self.last_in_family = true;
        self
    }
}

impl fmt::Debug for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Benchmark")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("threads", &self.threads)
            .field("iterations", &self.iterations)
            .field("repetitions", &self.repetitions)
            .field("min_time", &self.min_time)
            .field("use_real_time", &self.use_real_time)
            .field("use_manual_time", &self.use_manual_time)
            .field("complexity", &self.complexity)
            .field("last_in_family", &self.last_in_family)
            .finish_non_exhaustive()
    }
}
