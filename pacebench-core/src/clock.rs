//! Timing sources.
//!
//! Two clocks drive every measurement: a monotonic wall clock shared by all
//! threads and a per-thread CPU clock. Both are exposed as seconds (`f64`)
//! relative to a process-local epoch so that only differences are meaningful.

use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic wall-clock seconds since the first call in this process.
#[inline]
pub fn wall_time() -> f64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// CPU seconds consumed by the calling thread.
#[cfg(unix)]
#[inline]
pub fn thread_cpu_time() -> f64 {
    // SAFETY: all-zero is a valid timespec, and clock_gettime only writes
    // through the pointer we hand it.
    unsafe {
        let mut ts: libc::timespec = std::mem::zeroed();
        let rc = libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts);
        assert!(rc == 0, "clock_gettime(CLOCK_THREAD_CPUTIME_ID) failed");
        ts.tv_sec as f64 + ts.tv_nsec as f64 * 1e-9
    }
}

/// Fallback for platforms without a per-thread CPU clock: wall time is the
/// closest available approximation.
#[cfg(not(unix))]
#[inline]
pub fn thread_cpu_time() -> f64 {
    wall_time()
}
