//! Aggregation across the repetitions of one benchmark.

use std::collections::BTreeMap;

use pacebench_core::{Counter, UserCounters};
use pacebench_report::Run;

/// Reduce the repetition runs of a single benchmark into one synthetic row
/// per statistic descriptor.
///
/// Errored repetitions contribute nothing; if fewer than two clean runs
/// remain there is nothing meaningful to aggregate and the result is empty.
/// Each emitted row is named `<benchmark>_<statistic>` and applies the
/// descriptor's reducer to every measured column, including each user
/// counter.
pub fn compute_statistics(reports: &[Run]) -> Vec<Run> {
    let mut results = Vec::new();
    if reports.len() < 2 {
        return results;
    }
    let error_count = reports.iter().filter(|run| run.error_occurred).count();
    if reports.len() - error_count < 2 {
        return results;
    }

    debug_assert!(
        reports
            .iter()
            .all(|run| run.benchmark_name == reports[0].benchmark_name),
        "aggregation mixes repetitions of different benchmarks"
    );

    let mut real_times = Vec::with_capacity(reports.len());
    let mut cpu_times = Vec::with_capacity(reports.len());
    let mut bytes_rates = Vec::with_capacity(reports.len());
    let mut items_rates = Vec::with_capacity(reports.len());
    let mut counter_columns: BTreeMap<String, (Vec<f64>, Counter)> = BTreeMap::new();

    for run in reports.iter().filter(|run| !run.error_occurred) {
        real_times.push(run.real_accumulated_time);
        cpu_times.push(run.cpu_accumulated_time);
        bytes_rates.push(run.bytes_per_second);
        items_rates.push(run.items_per_second);
        for (name, counter) in &run.counters {
            counter_columns
                .entry(name.clone())
                .or_insert_with(|| (Vec::new(), *counter))
                .0
                .push(counter.value);
        }
    }

    // Labels are last-writer-wins within a trial; across repetitions the
    // last non-empty one carries over to the aggregate rows.
    let report_label = reports
        .iter()
        .rev()
        .find(|run| !run.report_label.is_empty())
        .map(|run| run.report_label.clone())
        .unwrap_or_default();

    let template = &reports[0];
    for statistic in &template.statistics {
        let mut counters = UserCounters::new();
        for (name, (column, sample)) in &counter_columns {
            counters.insert(
                name.clone(),
                Counter::new((statistic.compute)(column), sample.flags),
            );
        }
        results.push(Run {
            benchmark_name: format!("{}_{}", template.benchmark_name, statistic.name),
            iterations: template.iterations,
            real_accumulated_time: (statistic.compute)(&real_times),
            cpu_accumulated_time: (statistic.compute)(&cpu_times),
            time_unit: template.time_unit,
            bytes_per_second: (statistic.compute)(&bytes_rates),
            items_per_second: (statistic.compute)(&items_rates),
            counters,
            report_label: report_label.clone(),
            ..Run::default()
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacebench_core::{default_statistics, CounterFlags, TimeUnit};

    fn repetition(real: f64, cpu: f64) -> Run {
        Run {
            benchmark_name: "walk/16".to_string(),
            iterations: 1_000,
            real_accumulated_time: real,
            cpu_accumulated_time: cpu,
            time_unit: TimeUnit::Microsecond,
            statistics: default_statistics(),
            ..Run::default()
        }
    }

    #[test]
    fn one_row_per_descriptor_with_suffixed_names() {
        let reports = vec![repetition(1.0, 2.0), repetition(3.0, 4.0)];
        let aggregates = compute_statistics(&reports);

        let names: Vec<_> = aggregates.iter().map(|r| r.benchmark_name.as_str()).collect();
        assert_eq!(names, ["walk/16_mean", "walk/16_median", "walk/16_stddev"]);
        assert_eq!(aggregates[0].real_accumulated_time, 2.0);
        assert_eq!(aggregates[0].cpu_accumulated_time, 3.0);
        assert_eq!(aggregates[0].iterations, 1_000);
        assert_eq!(aggregates[0].time_unit, TimeUnit::Microsecond);
    }

    #[test]
    fn a_single_run_yields_no_aggregates() {
        assert!(compute_statistics(&[repetition(1.0, 1.0)]).is_empty());
        assert!(compute_statistics(&[]).is_empty());
    }

    #[test]
    fn errored_repetitions_are_excluded() {
        let mut errored = repetition(100.0, 100.0);
        errored.error_occurred = true;
        let reports = vec![repetition(1.0, 1.0), errored, repetition(3.0, 3.0)];

        let aggregates = compute_statistics(&reports);
        assert_eq!(aggregates[0].real_accumulated_time, 2.0);
    }

    #[test]
    fn too_many_errors_yield_no_aggregates() {
        let mut errored = repetition(1.0, 1.0);
        errored.error_occurred = true;
        let reports = vec![errored.clone(), errored, repetition(1.0, 1.0)];
        assert!(compute_statistics(&reports).is_empty());
    }

    #[test]
    fn counters_are_reduced_per_descriptor() {
        let mut first = repetition(1.0, 1.0);
        first
            .counters
            .insert("pages".to_string(), Counter::new(10.0, CounterFlags::RATE));
        let mut second = repetition(3.0, 3.0);
        second
            .counters
            .insert("pages".to_string(), Counter::new(30.0, CounterFlags::RATE));

        let aggregates = compute_statistics(&[first, second]);
        let mean_row = &aggregates[0];
        assert_eq!(mean_row.counters["pages"].value, 20.0);
        assert_eq!(mean_row.counters["pages"].flags, CounterFlags::RATE);
    }

    #[test]
    fn last_non_empty_label_carries_over() {
        let mut first = repetition(1.0, 1.0);
        first.report_label = "warm".to_string();
        let second = repetition(3.0, 3.0);

        let aggregates = compute_statistics(&[first, second]);
        assert_eq!(aggregates[0].report_label, "warm");
    }
}
