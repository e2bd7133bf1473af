//! Optional memory-accounting probe.
//!
//! A probe is registered once, before any benchmark runs; the runner then
//! brackets a short single-threaded pass with `start`/`stop` and attaches the
//! returned summary to the reported run. The registration is write-once, so
//! readers never observe a change mid-run.

use std::sync::OnceLock;

use thiserror::Error;

/// Allocation totals observed between `start` and `stop`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationSummary {
    pub num_allocs: i64,
    pub max_bytes_used: i64,
}

/// Collaborator that meters allocations. Invoked from a single thread.
pub trait MemoryProbe: Send + Sync {
    fn start(&self);
    fn stop(&self) -> AllocationSummary;
}

static MEMORY_PROBE: OnceLock<Box<dyn MemoryProbe>> = OnceLock::new();

/// Returned when a second probe registration is attempted.
#[derive(Debug, Error)]
#[error("a memory probe is already registered")]
pub struct ProbeAlreadyRegistered;

/// Install the process-wide memory probe. Call at most once, before running
/// any benchmark.
pub fn register_memory_probe(probe: Box<dyn MemoryProbe>) -> Result<(), ProbeAlreadyRegistered> {
    MEMORY_PROBE.set(probe).map_err(|_| ProbeAlreadyRegistered)
}

/// The registered probe, if any.
pub fn memory_probe() -> Option<&'static dyn MemoryProbe> {
    MEMORY_PROBE.get().map(|probe| probe.as_ref())
}
