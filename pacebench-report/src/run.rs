//! The finalized record of one benchmark run.

use pacebench_core::{BigO, BigOFunc, Statistic, TimeUnit, UserCounters};

/// Allocation summary attached when a memory probe is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationReport {
    pub allocs_per_iteration: f64,
    pub max_bytes_used: i64,
}

/// One reported run: either a measured trial, a per-statistic aggregate row,
/// or a synthetic complexity row.
///
/// `real_accumulated_time` holds the run's chosen time basis (manual time for
/// manual-time benchmarks, wall time otherwise); `cpu_accumulated_time` is
/// always the summed CPU time. Reporters display both through the
/// [`adjusted_real_time`](Run::adjusted_real_time) /
/// [`adjusted_cpu_time`](Run::adjusted_cpu_time) accessors, which scale to the
/// run's time unit and divide by the iteration count.
#[derive(Debug, Clone)]
pub struct Run {
    pub benchmark_name: String,
    /// Total iterations across all worker threads; 0 on synthetic rows.
    pub iterations: u64,
    pub real_accumulated_time: f64,
    pub cpu_accumulated_time: f64,
    pub time_unit: TimeUnit,
    /// 0 when the body reported no bytes.
    pub bytes_per_second: f64,
    /// 0 when the body reported no items.
    pub items_per_second: f64,
    pub complexity: BigO,
    pub complexity_lambda: Option<BigOFunc>,
    pub complexity_n: i64,
    pub counters: UserCounters,
    /// Re-emitted so the aggregation pass knows which reducers to apply.
    pub statistics: Vec<Statistic>,
    /// True on the `_BigO` row of a complexity fit: the time fields hold
    /// curve coefficients, not times.
    pub report_big_o: bool,
    /// True on the `_RMS` row of a complexity fit: the time fields hold a
    /// normalized error ratio.
    pub report_rms: bool,
    pub allocation: Option<AllocationReport>,
    pub error_occurred: bool,
    pub error_message: String,
    pub report_label: String,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            benchmark_name: String::new(),
            iterations: 0,
            real_accumulated_time: 0.0,
            cpu_accumulated_time: 0.0,
            time_unit: TimeUnit::default(),
            bytes_per_second: 0.0,
            items_per_second: 0.0,
            complexity: BigO::None,
            complexity_lambda: None,
            complexity_n: 0,
            counters: UserCounters::new(),
            statistics: Vec::new(),
            report_big_o: false,
            report_rms: false,
            allocation: None,
            error_occurred: false,
            error_message: String::new(),
            report_label: String::new(),
        }
    }
}

impl Run {
    /// Basis time per iteration, in the run's display unit. Synthetic rows
    /// carry ratios or coefficients and are returned unscaled by iterations.
    pub fn adjusted_real_time(&self) -> f64 {
        self.adjust(self.real_accumulated_time)
    }

    /// CPU time per iteration, in the run's display unit.
    pub fn adjusted_cpu_time(&self) -> f64 {
        self.adjust(self.cpu_accumulated_time)
    }

    fn adjust(&self, seconds: f64) -> f64 {
        let scaled = seconds * self.time_unit.multiplier();
        if self.iterations != 0 && !self.report_big_o && !self.report_rms {
            scaled / self.iterations as f64
        } else {
            scaled
        }
    }
}
