//! The adaptive iteration controller and repetition driver.
//!
//! One benchmark is measured by repeatedly trying a trial at a candidate
//! iteration count and growing that count until the measured time crosses
//! the minimum duration (or another terminal condition fires), then
//! repeating the whole sequence `repetitions` times and aggregating.

use std::sync::Arc;

use tracing::debug;

use pacebench_core::{
    finish_counters, memory_probe, run_worker, AggregationReport, AllocationSummary, Benchmark,
    BigO, TrialManager, TrialResults, MAX_ITERATIONS,
};
use pacebench_report::{AllocationReport, Run};
use pacebench_stats::{compute_big_o, compute_statistics};

use crate::config::HarnessOptions;

/// Next-trial target: overshoot the minimum time so the reported trial
/// comfortably clears it.
const OVERSHOOT_FACTOR: f64 = 1.4;
/// A trial shorter than this fraction of the minimum time is noise; its
/// multiplier is not trusted beyond [`MAX_GROWTH_MULTIPLIER`].
const SIGNIFICANCE_THRESHOLD: f64 = 0.1;
/// Growth cap applied after an insignificant trial.
const MAX_GROWTH_MULTIPLIER: f64 = 10.0;
/// Terminal exit when wall time has run far past the minimum while CPU time
/// (the default basis) has not accumulated, e.g. a benchmark that mostly
/// blocks. Manual-time benchmarks are exempt.
const RUNAWAY_REAL_TIME_FACTOR: f64 = 5.0;
/// The memory-probe pass runs at most this many iterations so one-time
/// allocations do not drown per-iteration behavior.
const MEMORY_PROBE_MAX_ITERATIONS: u64 = 16;

/// Everything one benchmark produced, split the way reporters consume it.
#[derive(Debug, Default)]
pub struct RunResults {
    pub non_aggregates: Vec<Run>,
    pub aggregates_only: Vec<Run>,
    pub display_report_aggregates_only: bool,
    pub file_report_aggregates_only: bool,
}

/// Execute one trial: all workers in lockstep at `iters` iterations.
/// Returns the merged results with real and manual time normalized to
/// per-thread means.
fn run_trial(benchmark: &Benchmark, iters: u64) -> TrialResults {
    let manager = Arc::new(TrialManager::new(benchmark.threads));
    std::thread::scope(|scope| {
        for thread_index in 1..benchmark.threads {
            let manager = Arc::clone(&manager);
            scope.spawn(move || run_worker(benchmark, iters, thread_index, &manager));
        }
        run_worker(benchmark, iters, 0, &manager);
        manager.wait_for_workers();
    });

    let mut results = manager.results().clone();
    // CPU time stays a sum over threads (total work); wall and manual time
    // were accumulated per thread, so only their mean is comparable.
    results.real_time_used /= benchmark.threads as f64;
    results.manual_time_used /= benchmark.threads as f64;
    results
}

/// Build the reported record for one finished trial.
fn create_run_report(
    benchmark: &Benchmark,
    results: &TrialResults,
    memory_iterations: u64,
    memory_result: AllocationSummary,
    seconds: f64,
) -> Run {
    let mut report = Run {
        benchmark_name: benchmark.name.clone(),
        error_occurred: results.has_error,
        error_message: results.error_message.clone(),
        report_label: results.report_label.clone(),
        iterations: results.iterations,
        time_unit: benchmark.time_unit,
        ..Run::default()
    };

    if report.error_occurred {
        return report;
    }

    if results.bytes_processed > 0 && seconds > 0.0 {
        report.bytes_per_second = results.bytes_processed as f64 / seconds;
    }
    if results.items_processed > 0 && seconds > 0.0 {
        report.items_per_second = results.items_processed as f64 / seconds;
    }

    report.real_accumulated_time = if benchmark.use_manual_time {
        results.manual_time_used
    } else {
        results.real_time_used
    };
    report.cpu_accumulated_time = results.cpu_time_used;
    report.complexity = benchmark.complexity;
    report.complexity_lambda = benchmark.complexity_lambda;
    report.complexity_n = results.complexity_n;
    report.statistics = benchmark.statistics.clone();
    report.counters = results.counters.clone();
    finish_counters(
        &mut report.counters,
        results.iterations,
        seconds,
        benchmark.threads,
    );

    if memory_iterations > 0 {
        report.allocation = Some(AllocationReport {
            allocs_per_iteration: memory_result.num_allocs as f64 / memory_iterations as f64,
            max_bytes_used: memory_result.max_bytes_used,
        });
    }

    report
}

/// Run one benchmark to completion: grow iterations until each repetition is
/// reportable, then aggregate. No-error repetition runs of a complexity
/// family accumulate in `complexity_reports`; the family member marked
/// `last_in_family` closes the family and turns them into synthetic rows.
pub fn run_benchmark(
    benchmark: &Benchmark,
    options: &HarnessOptions,
    complexity_reports: &mut Vec<Run>,
) -> RunResults {
    let mut run_results = RunResults::default();

    let has_explicit_iteration_count = benchmark.iterations != 0;
    let mut iters: u64 = if has_explicit_iteration_count {
        benchmark.iterations
    } else {
        1
    };
    let repeats = if benchmark.repetitions != 0 {
        benchmark.repetitions
    } else {
        options.repetitions
    };
    if repeats != 1 {
        run_results.display_report_aggregates_only =
            options.report_aggregates_only || options.display_aggregates_only;
        run_results.file_report_aggregates_only = options.report_aggregates_only;
        if benchmark.aggregation_report != AggregationReport::Unspecified {
            run_results.display_report_aggregates_only =
                benchmark.aggregation_report.display_aggregates_only();
            run_results.file_report_aggregates_only =
                benchmark.aggregation_report.file_aggregates_only();
        }
    }

    for repetition_num in 0..repeats {
        loop {
            debug!(name = %benchmark.name, iters, "running trial");

            let results = run_trial(benchmark, iters);

            debug!(
                cpu = results.cpu_time_used,
                real = results.real_time_used,
                "trial finished"
            );

            // The basis clock for the should-report decision.
            let seconds = if benchmark.use_manual_time {
                results.manual_time_used
            } else if benchmark.use_real_time {
                results.real_time_used
            } else {
                results.cpu_time_used
            };

            let min_time = if benchmark.min_time != 0.0 {
                benchmark.min_time
            } else {
                options.min_time
            };

            // Report this trial if it ran long enough, cannot be retried, or
            // carries an error; later repetitions reuse the settled count.
            let should_report = repetition_num > 0
                || has_explicit_iteration_count
                || results.has_error
                || iters >= MAX_ITERATIONS
                || seconds >= min_time
                || (results.real_time_used >= RUNAWAY_REAL_TIME_FACTOR * min_time
                    && !benchmark.use_manual_time);

            if should_report {
                let mut memory_iterations = 0;
                let mut memory_result = AllocationSummary::default();
                if !results.has_error {
                    if let Some(probe) = memory_probe() {
                        // A short single-threaded pass; long enough to see
                        // per-iteration allocations, short enough that
                        // one-time setup does not dominate.
                        memory_iterations = MEMORY_PROBE_MAX_ITERATIONS.min(iters);
                        probe.start();
                        let manager = Arc::new(TrialManager::new(1));
                        run_worker(benchmark, memory_iterations, 0, &manager);
                        manager.wait_for_workers();
                        memory_result = probe.stop();
                    }
                }

                let report =
                    create_run_report(benchmark, &results, memory_iterations, memory_result, seconds);
                if !report.error_occurred && benchmark.complexity != BigO::None {
                    complexity_reports.push(report.clone());
                }
                run_results.non_aggregates.push(report);
                break;
            }

            // Grow towards the minimum time, overshooting a little. A trial
            // under the significance threshold is too noisy to extrapolate
            // from, so its growth is capped.
            let mut multiplier = min_time * OVERSHOOT_FACTOR / seconds.max(1e-9);
            let is_significant = (seconds / min_time) > SIGNIFICANCE_THRESHOLD;
            if !is_significant {
                multiplier = multiplier.min(MAX_GROWTH_MULTIPLIER);
            }
            if multiplier <= 1.0 {
                multiplier = 2.0;
            }
            let mut next_iters = (multiplier * iters as f64).max(iters as f64 + 1.0);
            if next_iters > MAX_ITERATIONS as f64 {
                next_iters = MAX_ITERATIONS as f64;
            }
            iters = (next_iters + 0.5) as u64;
            debug!(next_iters = iters, multiplier, "trial too short, growing");
        }
    }

    run_results.aggregates_only = compute_statistics(&run_results.non_aggregates);

    if benchmark.complexity != BigO::None && benchmark.last_in_family {
        run_results
            .aggregates_only
            .extend(compute_big_o(complexity_reports));
        complexity_reports.clear();
    }

    run_results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacebench_core::Bencher;

    fn options(min_time: f64) -> HarnessOptions {
        HarnessOptions {
            min_time,
            ..HarnessOptions::default()
        }
    }

    #[test]
    fn explicit_iteration_count_runs_exactly_one_trial() {
        let benchmark = Benchmark::new("fixed", |b: &mut Bencher| {
            while b.keep_running() {}
        })
        .iterations(1000);
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(10.0), &mut family);

        assert_eq!(results.non_aggregates.len(), 1);
        let run = &results.non_aggregates[0];
        assert_eq!(run.iterations, 1000);
        assert!(!run.error_occurred);
        assert!(results.aggregates_only.is_empty(), "single repetition has no aggregates");
    }

    #[test]
    fn adaptive_growth_reaches_the_minimum_time() {
        let benchmark = Benchmark::new("spin", |b: &mut Bencher| {
            while b.keep_running() {
                std::hint::black_box((0..100u64).sum::<u64>());
            }
        });
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(0.02), &mut family);

        let run = &results.non_aggregates[0];
        assert!(!run.error_occurred);
        assert!(run.iterations > 1, "a no-op-scale body cannot satisfy 20ms in one iteration");
        assert!(
            run.cpu_accumulated_time >= 0.02
                || run.real_accumulated_time >= 5.0 * 0.02
                || run.iterations == MAX_ITERATIONS,
            "reported trial must have hit a terminal condition"
        );
    }

    #[test]
    fn error_trials_are_reported_immediately() {
        let benchmark = Benchmark::new("broken", |b: &mut Bencher| {
            let mut iteration = 0;
            while b.keep_running() {
                iteration += 1;
                if iteration == 3 {
                    b.skip_with_error("bad");
                }
            }
        });
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(10.0), &mut family);

        assert_eq!(results.non_aggregates.len(), 1);
        let run = &results.non_aggregates[0];
        assert!(run.error_occurred);
        assert_eq!(run.error_message, "bad");
        assert_eq!(run.bytes_per_second, 0.0);
    }

    #[test]
    fn repetitions_produce_aggregate_rows() {
        let benchmark = Benchmark::new("rep", |b: &mut Bencher| {
            while b.keep_running() {}
        })
        .iterations(100)
        .repetitions(3);
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(10.0), &mut family);

        assert_eq!(results.non_aggregates.len(), 3);
        let names: Vec<_> = results
            .aggregates_only
            .iter()
            .map(|r| r.benchmark_name.as_str())
            .collect();
        assert_eq!(names, ["rep_mean", "rep_median", "rep_stddev"]);
    }

    #[test]
    fn manual_time_is_the_basis_and_the_reported_real_time() {
        let benchmark = Benchmark::new("manual", |b: &mut Bencher| {
            while b.keep_running() {
                b.set_iteration_time(0.001);
            }
        })
        .use_manual_time()
        .iterations(1000);
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(0.5), &mut family);

        let run = &results.non_aggregates[0];
        assert!(
            (run.real_accumulated_time - 1.0).abs() < 1e-9,
            "1000 iterations of 1ms of manual time"
        );
    }

    #[test]
    fn multithreaded_trial_sums_iterations_and_items() {
        let benchmark = Benchmark::new("mt", |b: &mut Bencher| {
            let mut local_iterations = 0u64;
            while b.keep_running() {
                local_iterations += 1;
            }
            b.set_items_processed(10 * local_iterations);
        })
        .threads(4)
        .iterations(100);
        let mut family = Vec::new();

        let results = run_benchmark(&benchmark, &options(10.0), &mut family);

        let run = &results.non_aggregates[0];
        assert_eq!(run.iterations, 400, "iterations sum across the four workers");
        assert!(run.items_per_second > 0.0);
    }

    #[test]
    fn complexity_family_closes_on_the_last_member() {
        let body = |b: &mut Bencher| {
            let n = b.range(0);
            while b.keep_running() {}
            b.set_complexity_n(n);
        };
        let mut family = Vec::new();
        let opts = options(10.0);

        for (arg, last) in [(8i64, false), (64, false), (512, true)] {
            let mut benchmark = Benchmark::new(format!("walk/{arg}"), body)
                .arg(arg)
                .iterations(100)
                .complexity(BigO::ON);
            if last {
                benchmark = benchmark.last_in_family();
            }
            let results = run_benchmark(&benchmark, &opts, &mut family);
            if last {
                let names: Vec<_> = results
                    .aggregates_only
                    .iter()
                    .map(|r| r.benchmark_name.as_str())
                    .collect();
                assert_eq!(names, ["walk_BigO", "walk_RMS"]);
            } else {
                assert!(results.aggregates_only.is_empty());
            }
        }
        assert!(family.is_empty(), "closing the family clears the accumulator");
    }

    #[test]
    fn errored_family_members_are_not_fitted() {
        let mut family = Vec::new();
        let benchmark = Benchmark::new("walk/8", |b: &mut Bencher| {
            while b.keep_running() {
                b.skip_with_error("skip");
            }
        })
        .arg(8)
        .complexity(BigO::ON);

        run_benchmark(&benchmark, &options(10.0), &mut family);
        assert!(family.is_empty());
    }
}
