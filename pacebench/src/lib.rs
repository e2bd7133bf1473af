//! # Pacebench
//!
//! An adaptive microbenchmark harness. Each registered benchmark is retried
//! at growing iteration counts until its measured runtime is statistically
//! meaningful, optionally across several lockstepped worker threads, then
//! repeated and aggregated into summary rows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pacebench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let benchmarks = vec![
//!         Benchmark::new("sum/1k", |b| {
//!             let data: Vec<u64> = (0..1000).collect();
//!             while b.keep_running() {
//!                 std::hint::black_box(data.iter().sum::<u64>());
//!             }
//!         }),
//!     ];
//!     pacebench::run(benchmarks)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Threads, manual time, complexity
//!
//! ```ignore
//! Benchmark::new("contended_queue", body).threads(4);
//! Benchmark::new("gpu_kernel", body).use_manual_time();
//! Benchmark::new("sort/4096", body).arg(4096).complexity(BigO::ONLogN);
//! ```

// Re-export the execution core
pub use pacebench_core::{
    default_statistics, register_memory_probe, stat_mean, stat_median, stat_stddev,
    AggregationReport, AllocationSummary, Bencher, Benchmark, BigO, BigOFunc, Counter,
    CounterFlags, MemoryProbe, Statistic, StatisticsFunc, TimeUnit, UserCounters, MAX_ITERATIONS,
};

// Re-export records and reporters
pub use pacebench_report::{
    AllocationReport, ConsoleReporter, Context, CsvReporter, JsonReporter, Reporter, Run,
};

// Re-export the aggregation functions
pub use pacebench_stats::{compute_big_o, compute_statistics};

// Re-export the harness driver
pub use pacebench_cli::{run, run_benchmarks, run_with_cli, Cli, HarnessOptions};

/// Prelude for benchmark binaries.
pub mod prelude {
    pub use crate::{Bencher, Benchmark, BigO, Counter, CounterFlags, TimeUnit};
}
