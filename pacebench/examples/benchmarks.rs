//! A small benchmark binary exercising the main harness features.
//!
//! Run with `cargo run --release --example benchmarks -- --min-time 0.1`.

use pacebench::prelude::*;

fn sum_vector(b: &mut Bencher) {
    let n = b.range(0);
    let data: Vec<u64> = (0..n as u64).collect();
    while b.keep_running() {
        std::hint::black_box(data.iter().sum::<u64>());
    }
    b.set_complexity_n(n);
    b.set_bytes_processed(b.iterations() * n as u64 * 8);
}

fn string_formatting(b: &mut Bencher) {
    while b.keep_running() {
        std::hint::black_box(format!("{}-{}", 42, "suffix"));
    }
    b.set_items_processed(b.iterations());
}

fn paused_setup(b: &mut Bencher) {
    while b.keep_running() {
        b.pause_timing();
        let input: Vec<u64> = (0..1024).rev().collect();
        b.resume_timing();
        let mut sorted = std::hint::black_box(input);
        sorted.sort_unstable();
        std::hint::black_box(sorted);
    }
}

fn contended_counter(b: &mut Bencher) {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    while b.keep_running() {
        COUNTER.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() -> anyhow::Result<()> {
    let mut benchmarks = vec![
        Benchmark::new("string_format", string_formatting),
        Benchmark::new("sort_with_setup", paused_setup).time_unit(TimeUnit::Microsecond),
        Benchmark::new("contended_counter", contended_counter).threads(4),
    ];
    for (n, last) in [(64i64, false), (512, false), (4096, true)] {
        let mut bench = Benchmark::new(format!("sum_vector/{n}"), sum_vector)
            .arg(n)
            .complexity(BigO::ON);
        if last {
            bench = bench.last_in_family();
        }
        benchmarks.push(bench);
    }

    pacebench::run(benchmarks)?;
    Ok(())
}
