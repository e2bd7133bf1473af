//! User-defined counters and their reduction rules.

use std::collections::BTreeMap;
use std::ops::BitOr;

/// How a counter value is normalized at report time. Flags compose with `|`.
///
/// With no flags the value is reported as the plain sum over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterFlags(u32);

impl CounterFlags {
    /// Plain sum across threads.
    pub const NONE: CounterFlags = CounterFlags(0);
    /// Divide by the elapsed seconds of the trial (a per-second rate).
    pub const RATE: CounterFlags = CounterFlags(1 << 0);
    /// Divide by the number of worker threads (a per-thread mean).
    pub const AVG_THREADS: CounterFlags = CounterFlags(1 << 1);
    /// Scale by the total iteration count (for values that do not grow with
    /// iterations, e.g. a working-set size).
    pub const ITERATION_INVARIANT: CounterFlags = CounterFlags(1 << 2);
    /// Divide by the total iteration count (a per-iteration mean).
    pub const AVG_ITERATIONS: CounterFlags = CounterFlags(1 << 3);

    pub fn contains(self, other: CounterFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CounterFlags {
    type Output = CounterFlags;

    fn bitor(self, rhs: CounterFlags) -> CounterFlags {
        CounterFlags(self.0 | rhs.0)
    }
}

/// A single user counter: the accumulated value plus its reduction flags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Counter {
    pub value: f64,
    pub flags: CounterFlags,
}

impl Counter {
    pub fn new(value: f64, flags: CounterFlags) -> Self {
        Self { value, flags }
    }
}

impl From<f64> for Counter {
    fn from(value: f64) -> Self {
        Counter::new(value, CounterFlags::NONE)
    }
}

/// Counters keyed by name. A `BTreeMap` keeps reporter output in a stable
/// order.
pub type UserCounters = BTreeMap<String, Counter>;

/// Merge one worker's counters into the shared map, summing values for keys
/// present on both sides. The flags of the first writer stick.
pub fn increment(total: &mut UserCounters, part: &UserCounters) {
    for (name, counter) in part {
        total
            .entry(name.clone())
            .and_modify(|existing| existing.value += counter.value)
            .or_insert(*counter);
    }
}

/// Apply each counter's reduction flags, producing the reported value.
pub fn finish(counters: &mut UserCounters, iterations: u64, seconds: f64, threads: usize) {
    for counter in counters.values_mut() {
        let mut v = counter.value;
        if counter.flags.contains(CounterFlags::RATE) {
            v /= seconds;
        }
        if counter.flags.contains(CounterFlags::AVG_THREADS) {
            v /= threads as f64;
        }
        if counter.flags.contains(CounterFlags::ITERATION_INVARIANT) {
            v *= iterations as f64;
        }
        if counter.flags.contains(CounterFlags::AVG_ITERATIONS) {
            v /= iterations as f64;
        }
        counter.value = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str, counter: Counter) -> UserCounters {
        let mut map = UserCounters::new();
        map.insert(name.to_string(), counter);
        map
    }

    #[test]
    fn increment_sums_matching_keys_and_inserts_new_ones() {
        let mut total = single("hits", Counter::new(3.0, CounterFlags::NONE));
        let mut part = single("hits", Counter::new(4.0, CounterFlags::NONE));
        part.insert("misses".to_string(), Counter::new(1.0, CounterFlags::RATE));

        increment(&mut total, &part);

        assert_eq!(total["hits"].value, 7.0);
        assert_eq!(total["misses"].value, 1.0);
        assert_eq!(total["misses"].flags, CounterFlags::RATE);
    }

    #[test]
    fn plain_counter_is_untouched_by_finish() {
        let mut counters = single("ops", Counter::new(800.0, CounterFlags::NONE));
        finish(&mut counters, 100, 2.0, 4);
        assert_eq!(counters["ops"].value, 800.0);
    }

    #[test]
    fn rate_divides_by_seconds() {
        let mut counters = single("ops", Counter::new(800.0, CounterFlags::RATE));
        finish(&mut counters, 100, 2.0, 4);
        assert_eq!(counters["ops"].value, 400.0);
    }

    #[test]
    fn avg_threads_rate_composes_both_divisions() {
        let mut counters = single(
            "ops",
            Counter::new(800.0, CounterFlags::RATE | CounterFlags::AVG_THREADS),
        );
        finish(&mut counters, 100, 2.0, 4);
        assert_eq!(counters["ops"].value, 100.0);
    }

    #[test]
    fn avg_iterations_divides_by_iteration_count() {
        let mut counters = single("ops", Counter::new(800.0, CounterFlags::AVG_ITERATIONS));
        finish(&mut counters, 100, 2.0, 4);
        assert_eq!(counters["ops"].value, 8.0);
    }

    #[test]
    fn iteration_invariant_scales_by_iteration_count() {
        let mut counters = single(
            "set_size",
            Counter::new(64.0, CounterFlags::ITERATION_INVARIANT),
        );
        finish(&mut counters, 10, 2.0, 1);
        assert_eq!(counters["set_size"].value, 640.0);
    }
}
