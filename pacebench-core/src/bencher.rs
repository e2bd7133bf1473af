//! The run state handed to a benchmark body.

use std::sync::Arc;

use crate::counters::UserCounters;
use crate::manager::TrialManager;
use crate::timer::ThreadTimer;

/// Per-worker run state: iteration loop control, timing pause/resume, error
/// signalling, and byte/item/counter accounting.
///
/// One `Bencher` is constructed per worker thread per trial. The body drives
/// the measured loop with [`keep_running`](Bencher::keep_running):
///
/// ```ignore
/// fn body(b: &mut Bencher) {
///     while b.keep_running() {
///         work();
///     }
/// }
/// ```
///
/// The loop must run to completion: returning from the body while
/// `keep_running` would still yield `true` is a fatal usage error, because a
/// partial loop would report misleading timings.
//
// `remaining` and `error_occurred` are what the hot loop touches; the layout
// is fixed so both sit on the struct's first cache line.
#[repr(C)]
pub struct Bencher {
    remaining: u64,
    max_iterations: u64,
    started: bool,
    finished: bool,
    error_occurred: bool,
    thread_index: usize,
    threads: usize,
    bytes_processed: u64,
    items_processed: u64,
    complexity_n: i64,
    args: Vec<i64>,
    /// User counters, merged into the trial results when the worker exits.
    pub counters: UserCounters,
    timer: ThreadTimer,
    manager: Arc<TrialManager>,
}

const _: () = assert!(
    std::mem::offset_of!(Bencher, error_occurred) < 64,
    "the error flag must stay on the first cache line"
);

impl Bencher {
    pub fn new(
        max_iterations: u64,
        args: Vec<i64>,
        thread_index: usize,
        threads: usize,
        manager: Arc<TrialManager>,
    ) -> Self {
        assert!(max_iterations != 0, "at least one iteration must be run");
        assert!(
            thread_index < threads,
            "thread_index must be less than the thread count"
        );
        Self {
            remaining: 0,
            max_iterations,
            started: false,
            finished: false,
            error_occurred: false,
            thread_index,
            threads,
            bytes_processed: 0,
            items_processed: 0,
            complexity_n: 0,
            args,
            counters: UserCounters::new(),
            timer: ThreadTimer::new(),
            manager,
        }
    }

    /// Advance the measured loop. Returns `true` while the body should run
    /// another iteration.
    ///
    /// The first call passes the start barrier and starts the timer; the
    /// call that exhausts the iteration budget stops the timer, passes the
    /// stop barrier, and returns `false`.
    #[inline]
    pub fn keep_running(&mut self) -> bool {
        if !self.started {
            self.start_keep_running();
        }
        if self.remaining == 0 {
            self.finish_keep_running();
            return false;
        }
        self.remaining -= 1;
        true
    }

    #[cold]
    fn start_keep_running(&mut self) {
        assert!(!self.started && !self.finished, "keep_running after the loop finished");
        self.started = true;
        self.remaining = if self.error_occurred { 0 } else { self.max_iterations };
        self.manager.start_stop_barrier();
        if !self.error_occurred {
            self.timer.start();
        }
    }

    #[cold]
    fn finish_keep_running(&mut self) {
        assert!(
            self.started && (!self.finished || self.error_occurred),
            "keep_running after the loop finished"
        );
        if !self.error_occurred {
            self.timer.stop();
        }
        self.remaining = 0;
        self.finished = true;
        self.manager.start_stop_barrier();
    }

    /// Stop the timer around a segment that must not count, e.g. rebuilding
    /// an input. Only valid inside the measured loop of an error-free run.
    pub fn pause_timing(&mut self) {
        assert!(
            self.started && !self.finished && !self.error_occurred,
            "pause_timing outside the measured loop"
        );
        self.timer.stop();
    }

    /// Restart the timer after [`pause_timing`](Bencher::pause_timing).
    pub fn resume_timing(&mut self) {
        assert!(
            self.started && !self.finished && !self.error_occurred,
            "resume_timing outside the measured loop"
        );
        self.timer.start();
    }

    /// Abandon the run and record `message` against the trial. The first
    /// non-empty message across all workers wins. The body is still expected
    /// to drive its loop until `keep_running` returns `false`; the next call
    /// does so immediately.
    pub fn skip_with_error(&mut self, message: &str) {
        self.error_occurred = true;
        {
            let mut results = self.manager.results();
            if !results.has_error {
                results.error_message = message.to_string();
                results.has_error = true;
            }
        }
        self.remaining = 0;
        if self.timer.running() {
            self.timer.stop();
        }
    }

    /// Report a manually measured interval for the current iteration, in
    /// seconds. Only meaningful for benchmarks registered with manual time.
    pub fn set_iteration_time(&mut self, seconds: f64) {
        self.timer.set_iteration_time(seconds);
    }

    /// Attach a free-form label to the reported run. Last writer wins across
    /// workers.
    pub fn set_label(&mut self, label: &str) {
        self.manager.results().report_label = label.to_string();
    }

    pub fn set_bytes_processed(&mut self, bytes: u64) {
        self.bytes_processed = bytes;
    }

    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    pub fn set_items_processed(&mut self, items: u64) {
        self.items_processed = items;
    }

    pub fn items_processed(&self) -> u64 {
        self.items_processed
    }

    /// Record the problem size for complexity fitting.
    pub fn set_complexity_n(&mut self, n: i64) {
        self.complexity_n = n;
    }

    pub fn complexity_n(&self) -> i64 {
        self.complexity_n
    }

    /// The `i`-th registered argument of this benchmark.
    pub fn range(&self, i: usize) -> i64 {
        self.args[i]
    }

    /// How many iterations the body has consumed so far. After a completed
    /// loop this equals the requested iteration count, including on the
    /// error path.
    pub fn iterations(&self) -> u64 {
        if self.started {
            self.max_iterations - self.remaining
        } else {
            0
        }
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn thread_index(&self) -> usize {
        self.thread_index
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn error_occurred(&self) -> bool {
        self.error_occurred
    }

    pub(crate) fn timer(&self) -> &ThreadTimer {
        &self.timer
    }
}
