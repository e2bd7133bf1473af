//! CSV output.
//!
//! The fixed columns are written up front; user-counter columns are appended
//! to the header the first time runs arrive, in sorted name order, so every
//! row lines up for the whole document.

use std::collections::BTreeSet;
use std::io::Write;

use crate::reporter::{Context, Reporter};
use crate::run::Run;

const FIXED_COLUMNS: &[&str] = &[
    "name",
    "iterations",
    "real_time",
    "cpu_time",
    "time_unit",
    "bytes_per_second",
    "items_per_second",
    "label",
    "error_occurred",
    "error_message",
];

pub struct CsvReporter {
    out: Box<dyn Write + Send>,
    counter_columns: Option<Vec<String>>,
}

impl CsvReporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            counter_columns: None,
        }
    }

    fn print_header(&mut self, runs: &[Run]) -> Vec<String> {
        let names: BTreeSet<String> = runs
            .iter()
            .flat_map(|run| run.counters.keys().cloned())
            .collect();
        let columns: Vec<String> = names.into_iter().collect();
        let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(columns.iter().map(|c| format!("\"{}\"", c)));
        let _ = writeln!(self.out, "{}", header.join(","));
        columns
    }

    fn print_run(&mut self, run: &Run, counter_columns: &[String]) {
        let mut fields: Vec<String> = Vec::with_capacity(FIXED_COLUMNS.len());
        fields.push(format!("\"{}\"", run.benchmark_name.replace('"', "\"\"")));
        if run.error_occurred {
            // Only the name and the error columns are meaningful.
            fields.extend(std::iter::repeat(String::new()).take(7));
            fields.push("true".to_string());
            fields.push(format!("\"{}\"", run.error_message.replace('"', "\"\"")));
        } else {
            fields.push(run.iterations.to_string());
            fields.push(format!("{}", run.adjusted_real_time()));
            fields.push(format!("{}", run.adjusted_cpu_time()));
            fields.push(run.time_unit.suffix().to_string());
            fields.push(if run.bytes_per_second > 0.0 {
                format!("{}", run.bytes_per_second)
            } else {
                String::new()
            });
            fields.push(if run.items_per_second > 0.0 {
                format!("{}", run.items_per_second)
            } else {
                String::new()
            });
            fields.push(if run.report_label.is_empty() {
                String::new()
            } else {
                format!("\"{}\"", run.report_label.replace('"', "\"\""))
            });
            fields.push(String::new());
            fields.push(String::new());
        }
        for column in counter_columns {
            fields.push(
                run.counters
                    .get(column)
                    .map(|counter| format!("{}", counter.value))
                    .unwrap_or_default(),
            );
        }
        let _ = writeln!(self.out, "{}", fields.join(","));
    }
}

impl Reporter for CsvReporter {
    fn report_context(&mut self, _context: &Context) -> bool {
        true
    }

    fn report_runs(&mut self, runs: &[Run]) {
        if self.counter_columns.is_none() {
            let columns = self.print_header(runs);
            self.counter_columns = Some(columns);
        }
        let columns = self.counter_columns.clone().unwrap_or_default();
        for run in runs {
            self.print_run(run, &columns);
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}
