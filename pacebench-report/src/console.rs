//! Human-readable tabular output.

use std::io::Write;

use crate::reporter::{Context, Reporter};
use crate::run::Run;

/// Writes one padded row per run to its output stream.
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
    name_field_width: usize,
}

impl ConsoleReporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            name_field_width: 10,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn print_run(&mut self, run: &Run) {
        let width = self.name_field_width;

        if run.error_occurred {
            let _ = writeln!(
                self.out,
                "{:<width$} ERROR OCCURRED: '{}'",
                run.benchmark_name, run.error_message
            );
            return;
        }

        let mut row = if run.report_big_o {
            let notation = run.complexity.notation();
            format!(
                "{:<width$} {:>10.2} {:<4} {:>10.2} {:<4}",
                run.benchmark_name,
                run.adjusted_real_time(),
                notation,
                run.adjusted_cpu_time(),
                notation,
            )
        } else if run.report_rms {
            format!(
                "{:<width$} {:>10.0} % {:>10.0} %",
                run.benchmark_name,
                run.adjusted_real_time() * 100.0,
                run.adjusted_cpu_time() * 100.0,
            )
        } else {
            let unit = run.time_unit.suffix();
            format!(
                "{:<width$} {:>10.0} {:<4} {:>10.0} {:<4} {:>10}",
                run.benchmark_name,
                run.adjusted_real_time(),
                unit,
                run.adjusted_cpu_time(),
                unit,
                run.iterations,
            )
        };

        if run.bytes_per_second > 0.0 {
            row.push_str(&format!(" {}B/s", human_rate(run.bytes_per_second)));
        }
        if run.items_per_second > 0.0 {
            row.push_str(&format!(" {} items/s", human_rate(run.items_per_second)));
        }
        for (name, counter) in &run.counters {
            row.push_str(&format!(" {}={}", name, human_rate(counter.value)));
        }
        if let Some(allocation) = &run.allocation {
            row.push_str(&format!(
                " allocs/iter={:.0} peak_bytes={}",
                allocation.allocs_per_iteration, allocation.max_bytes_used
            ));
        }
        if !run.report_label.is_empty() {
            row.push(' ');
            row.push_str(&run.report_label);
        }

        let _ = writeln!(self.out, "{}", row);
    }
}

impl Reporter for ConsoleReporter {
    fn report_context(&mut self, context: &Context) -> bool {
        self.name_field_width = context.name_field_width;
        let _ = writeln!(self.out, "{}", context.timestamp.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(self.out, "Running {}", context.executable_name);
        let caption = format!(
            "{:<width$} {:>10} {:>15} {:>10}",
            "Benchmark",
            "Time",
            "CPU",
            "Iterations",
            width = context.name_field_width
        );
        let _ = writeln!(self.out, "{}", caption);
        let _ = writeln!(self.out, "{}", "-".repeat(caption.len()));
        true
    }

    fn report_runs(&mut self, runs: &[Run]) {
        for run in runs {
            self.print_run(run);
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

/// Scale a rate into a compact `k`/`M`/`G` form.
fn human_rate(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.4}G", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.4}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.4}k", value / 1e3)
    } else {
        format!("{:.4}", value)
    }
}
