//! Per-trial coordination between worker threads.

use std::sync::{Barrier, Condvar, Mutex, MutexGuard};

use crate::counters::UserCounters;

/// Measurements merged from every worker of one trial.
///
/// All mutation happens under the [`TrialManager`] mutex. `cpu_time_used` is
/// a sum over threads (total work); `real_time_used` and `manual_time_used`
/// are also summed here and divided by the thread count once the trial is
/// over, since only their per-thread mean is meaningful.
#[derive(Debug, Clone, Default)]
pub struct TrialResults {
    pub iterations: u64,
    pub cpu_time_used: f64,
    pub real_time_used: f64,
    pub manual_time_used: f64,
    pub bytes_processed: u64,
    pub items_processed: u64,
    pub complexity_n: i64,
    pub counters: UserCounters,
    /// Sticky: set by the first worker that skips with an error.
    pub has_error: bool,
    /// First non-empty message wins.
    pub error_message: String,
    /// Last writer wins.
    pub report_label: String,
}

/// Shared state for the workers of a single trial.
///
/// The barrier is reused for two rendezvous: every worker passes it once
/// before starting its timer (no thread measures while a peer is still
/// initializing) and once after finishing (no worker is still timing when
/// the controller reads the results). The completion latch lets the
/// controller block until every merge has happened.
pub struct TrialManager {
    results: Mutex<TrialResults>,
    start_stop: Barrier,
    outstanding: Mutex<usize>,
    all_done: Condvar,
}

impl TrialManager {
    pub fn new(threads: usize) -> Self {
        assert!(threads >= 1, "a trial needs at least one worker");
        Self {
            results: Mutex::new(TrialResults::default()),
            start_stop: Barrier::new(threads),
            outstanding: Mutex::new(threads),
            all_done: Condvar::new(),
        }
    }

    /// Rendezvous of all workers. Used at the start and at the end of the
    /// timed region.
    pub fn start_stop_barrier(&self) {
        self.start_stop.wait();
    }

    /// Called by each worker after it has merged its measurements. The last
    /// caller releases [`wait_for_workers`](TrialManager::wait_for_workers).
    pub fn notify_worker_done(&self) {
        let mut outstanding = self
            .outstanding
            .lock()
            .expect("trial latch poisoned by a panicked worker");
        assert!(*outstanding > 0, "more notifications than workers");
        *outstanding -= 1;
        if *outstanding == 0 {
            self.all_done.notify_all();
        }
    }

    /// Block until every worker has called
    /// [`notify_worker_done`](TrialManager::notify_worker_done).
    pub fn wait_for_workers(&self) {
        let mut outstanding = self
            .outstanding
            .lock()
            .expect("trial latch poisoned by a panicked worker");
        while *outstanding > 0 {
            outstanding = self
                .all_done
                .wait(outstanding)
                .expect("trial latch poisoned by a panicked worker");
        }
    }

    /// Lock and return the shared results. Every read or write of the merged
    /// measurements goes through this guard.
    pub fn results(&self) -> MutexGuard<'_, TrialResults> {
        self.results
            .lock()
            .expect("trial results poisoned by a panicked worker")
    }
}
