//! Per-thread timing accumulation.

use crate::clock::{thread_cpu_time, wall_time};

/// Accumulates CPU time, wall time, and user-supplied manual time for one
/// worker thread.
///
/// Each worker owns its timer exclusively, so there is no locking here. The
/// harness brackets the measured loop with [`start`](ThreadTimer::start) /
/// [`stop`](ThreadTimer::stop); the benchmark body may toggle the same pair
/// through `Bencher::pause_timing` / `Bencher::resume_timing` to exclude
/// setup work from the totals.
#[derive(Debug, Default)]
pub struct ThreadTimer {
    running: bool,
    start_real: f64,
    start_cpu: f64,
    real_time_used: f64,
    cpu_time_used: f64,
    manual_time_used: f64,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin accumulating. The timer must be stopped.
    pub fn start(&mut self) {
        assert!(!self.running, "ThreadTimer::start called while running");
        self.start_real = wall_time();
        self.start_cpu = thread_cpu_time();
        self.running = true;
    }

    /// Stop accumulating and fold the elapsed interval into the totals. The
    /// timer must be running.
    pub fn stop(&mut self) {
        assert!(self.running, "ThreadTimer::stop called while stopped");
        self.real_time_used += wall_time() - self.start_real;
        self.cpu_time_used += thread_cpu_time() - self.start_cpu;
        self.running = false;
    }

    /// Add user-measured seconds to the manual accumulator. Valid at any
    /// time; the benchmark body decides what the interval means.
    pub fn set_iteration_time(&mut self, seconds: f64) {
        self.manual_time_used += seconds;
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn cpu_time_used(&self) -> f64 {
        self.cpu_time_used
    }

    pub fn real_time_used(&self) -> f64 {
        self.real_time_used
    }

    pub fn manual_time_used(&self) -> f64 {
        self.manual_time_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn accumulates_across_start_stop_pairs() {
        let mut timer = ThreadTimer::new();
        timer.start();
        std::thread::sleep(Duration::from_millis(10));
        timer.stop();
        let first = timer.real_time_used();
        assert!(first >= 0.005);

        timer.start();
        std::thread::sleep(Duration::from_millis(10));
        timer.stop();
        assert!(timer.real_time_used() > first, "second interval must add on");
    }

    #[test]
    fn paused_interval_is_not_counted() {
        let mut timer = ThreadTimer::new();
        timer.start();
        timer.stop();
        let measured = timer.real_time_used();
        // Everything that happens here is outside start/stop.
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(timer.real_time_used(), measured);
    }

    #[test]
    fn manual_time_accumulates_independently() {
        let mut timer = ThreadTimer::new();
        timer.set_iteration_time(0.25);
        timer.set_iteration_time(0.75);
        assert_eq!(timer.manual_time_used(), 1.0);
        assert_eq!(timer.cpu_time_used(), 0.0);
        assert_eq!(timer.real_time_used(), 0.0);
    }

    #[test]
    #[should_panic(expected = "while running")]
    fn double_start_is_a_contract_violation() {
        let mut timer = ThreadTimer::new();
        timer.start();
        timer.start();
    }

    #[test]
    #[should_panic(expected = "while stopped")]
    fn stop_without_start_is_a_contract_violation() {
        let mut timer = ThreadTimer::new();
        timer.stop();
    }
}
