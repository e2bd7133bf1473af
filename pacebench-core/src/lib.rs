//! Pacebench Core - Execution Runtime
//!
//! This crate provides the pieces a single benchmark trial is built from:
//! - [`Bencher`], the run state handed to benchmark bodies
//! - [`ThreadTimer`], per-thread CPU/wall/manual time accumulation
//! - [`TrialManager`], the barrier-and-latch coordination shared by the
//!   workers of one trial
//! - [`Benchmark`], the definition a discovery layer hands to the harness
//! - user counters with reduction flags, statistic descriptors, and the
//!   write-once memory-probe registration

pub mod clock;

mod bencher;
mod benchmark;
mod counters;
mod manager;
mod memory;
mod statistics;
mod timer;
mod worker;

pub use bencher::Bencher;
pub use benchmark::{AggregationReport, Benchmark, BenchmarkFn, BigO, BigOFunc, TimeUnit};
pub use counters::{finish as finish_counters, increment as increment_counters, Counter, CounterFlags, UserCounters};
pub use manager::{TrialManager, TrialResults};
pub use memory::{
    memory_probe, register_memory_probe, AllocationSummary, MemoryProbe, ProbeAlreadyRegistered,
};
pub use statistics::{default_statistics, stat_mean, stat_median, stat_stddev, Statistic, StatisticsFunc};
pub use timer::ThreadTimer;
pub use worker::run_worker;

/// Hard cap on the iteration count of a single trial. Reaching it forces the
/// trial to be reported no matter how little time it took.
pub const MAX_ITERATIONS: u64 = 1_000_000_000;
