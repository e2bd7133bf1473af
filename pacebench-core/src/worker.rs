//! One worker thread's share of a trial.

use std::sync::Arc;

use crate::bencher::Bencher;
use crate::benchmark::Benchmark;
use crate::counters;
use crate::manager::TrialManager;

/// Execute `benchmark` for `iters` iterations on the calling thread and merge
/// the collected timings and counters into the shared trial results.
///
/// Every worker of a trial runs through here, including the controller
/// itself as worker 0. Panics if the body returns while its `keep_running`
/// loop still had iterations left; a partial loop would report garbage.
pub fn run_worker(benchmark: &Benchmark, iters: u64, thread_index: usize, manager: &Arc<TrialManager>) {
    let mut bencher = Bencher::new(
        iters,
        benchmark.args.clone(),
        thread_index,
        benchmark.threads,
        Arc::clone(manager),
    );
    (benchmark.body)(&mut bencher);
    assert!(
        bencher.iterations() >= bencher.max_iterations(),
        "benchmark '{}' returned before Bencher::keep_running() returned false",
        benchmark.name
    );
    {
        let mut results = manager.results();
        results.iterations += bencher.iterations();
        results.cpu_time_used += bencher.timer().cpu_time_used();
        results.real_time_used += bencher.timer().real_time_used();
        results.manual_time_used += bencher.timer().manual_time_used();
        results.bytes_processed += bencher.bytes_processed();
        results.items_processed += bencher.items_processed();
        results.complexity_n += bencher.complexity_n();
        counters::increment(&mut results.counters, &bencher.counters);
    }
    manager.notify_worker_done();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{Counter, CounterFlags};

    #[test]
    fn single_worker_merges_its_measurements() {
        let benchmark = Benchmark::new("merge", |b: &mut Bencher| {
            while b.keep_running() {}
            b.set_items_processed(7);
            b.set_bytes_processed(128);
            b.counters
                .insert("probes".to_string(), Counter::new(3.0, CounterFlags::NONE));
        });
        let manager = Arc::new(TrialManager::new(1));
        run_worker(&benchmark, 50, 0, &manager);
        manager.wait_for_workers();

        let results = manager.results();
        assert_eq!(results.iterations, 50);
        assert_eq!(results.items_processed, 7);
        assert_eq!(results.bytes_processed, 128);
        assert_eq!(results.counters["probes"].value, 3.0);
        assert!(results.cpu_time_used >= 0.0);
        assert!(!results.has_error);
    }

    #[test]
    fn four_workers_sum_iterations_and_counters() {
        let benchmark = Benchmark::new("sum", |b: &mut Bencher| {
            while b.keep_running() {}
            b.set_items_processed(10);
        })
        .threads(4);
        let manager = Arc::new(TrialManager::new(4));

        std::thread::scope(|scope| {
            for thread_index in 1..4 {
                let manager = Arc::clone(&manager);
                let benchmark = &benchmark;
                scope.spawn(move || run_worker(benchmark, 25, thread_index, &manager));
            }
            run_worker(&benchmark, 25, 0, &manager);
            manager.wait_for_workers();
        });

        let results = manager.results();
        assert_eq!(results.iterations, 100);
        assert_eq!(results.items_processed, 40);
    }

    #[test]
    #[should_panic(expected = "returned before")]
    fn body_returning_early_is_fatal() {
        let benchmark = Benchmark::new("early", |b: &mut Bencher| {
            // Consume a couple of iterations, then bail out of the loop.
            b.keep_running();
            b.keep_running();
        });
        let manager = Arc::new(TrialManager::new(1));
        run_worker(&benchmark, 10, 0, &manager);
    }
}
