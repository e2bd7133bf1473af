//! JSON output, written as one document on finalize.

use std::io::Write;

use serde::Serialize;

use crate::reporter::{Context, Reporter};
use crate::run::Run;

#[derive(Serialize)]
struct JsonDocument {
    context: JsonContext,
    benchmarks: Vec<JsonRun>,
}

#[derive(Serialize, Default)]
struct JsonContext {
    date: String,
    executable: String,
}

/// Serde mirror of [`Run`] with only the fields the document carries.
#[derive(Serialize)]
struct JsonRun {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_type: Option<&'static str>,
    iterations: u64,
    real_time: f64,
    cpu_time: f64,
    time_unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    big_o: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rms: Option<f64>,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    counters: std::collections::BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allocs_per_iteration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_bytes_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    label: String,
}

impl From<&Run> for JsonRun {
    fn from(run: &Run) -> Self {
        JsonRun {
            name: run.benchmark_name.clone(),
            run_type: if run.report_big_o {
                Some("BigO")
            } else if run.report_rms {
                Some("RMS")
            } else {
                None
            },
            iterations: run.iterations,
            real_time: run.adjusted_real_time(),
            cpu_time: run.adjusted_cpu_time(),
            time_unit: run.time_unit.suffix(),
            bytes_per_second: (run.bytes_per_second > 0.0).then_some(run.bytes_per_second),
            items_per_second: (run.items_per_second > 0.0).then_some(run.items_per_second),
            big_o: run.report_big_o.then(|| run.complexity.notation()),
            rms: run.report_rms.then_some(run.adjusted_cpu_time()),
            counters: run
                .counters
                .iter()
                .map(|(name, counter)| (name.clone(), counter.value))
                .collect(),
            allocs_per_iteration: run.allocation.map(|a| a.allocs_per_iteration),
            max_bytes_used: run.allocation.map(|a| a.max_bytes_used),
            error_message: run.error_occurred.then(|| run.error_message.clone()),
            label: run.report_label.clone(),
        }
    }
}

/// Collects runs and serializes the whole document when finalized.
pub struct JsonReporter {
    out: Box<dyn Write + Send>,
    context: JsonContext,
    benchmarks: Vec<JsonRun>,
}

impl JsonReporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            context: JsonContext::default(),
            benchmarks: Vec::new(),
        }
    }
}

impl Reporter for JsonReporter {
    fn report_context(&mut self, context: &Context) -> bool {
        self.context = JsonContext {
            date: context.timestamp.to_rfc3339(),
            executable: context.executable_name.clone(),
        };
        true
    }

    fn report_runs(&mut self, runs: &[Run]) {
        self.benchmarks.extend(runs.iter().map(JsonRun::from));
    }

    fn finalize(&mut self) {
        let document = JsonDocument {
            context: std::mem::take(&mut self.context),
            benchmarks: std::mem::take(&mut self.benchmarks),
        };
        if serde_json::to_writer_pretty(&mut self.out, &document).is_ok() {
            let _ = writeln!(self.out);
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacebench_core::{Counter, CounterFlags, TimeUnit};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn document_is_valid_json_with_expected_fields() {
        let buf = SharedBuf::default();
        let mut reporter = JsonReporter::new(Box::new(buf.clone()));
        assert!(reporter.report_context(&Context::new("bench_bin", 10)));

        let mut run = Run {
            benchmark_name: "parse/64".to_string(),
            iterations: 500,
            real_accumulated_time: 5e-4,
            cpu_accumulated_time: 1e-3,
            time_unit: TimeUnit::Nanosecond,
            ..Run::default()
        };
        run.counters
            .insert("pages".to_string(), Counter::new(12.0, CounterFlags::NONE));
        reporter.report_runs(&[run]);
        reporter.finalize();

        let raw = buf.0.lock().unwrap().clone();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed["context"]["executable"], "bench_bin");
        let bench = &parsed["benchmarks"][0];
        assert_eq!(bench["name"], "parse/64");
        assert_eq!(bench["iterations"], 500);
        assert_eq!(bench["time_unit"], "ns");
        assert_eq!(bench["counters"]["pages"], 12.0);
        assert!(bench.get("error_message").is_none());
        // 5e-4 s over 500 iterations is 1000 ns.
        assert!((bench["real_time"].as_f64().unwrap() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn rms_rows_serialize_the_dimensionless_ratio() {
        let buf = SharedBuf::default();
        let mut reporter = JsonReporter::new(Box::new(buf.clone()));

        // A fit-error row stores its ratio pre-divided by the unit multiplier
        // so the reporter's scaling restores it; a 5% error must come out as
        // 0.05, not 0.05 / 1e9.
        let ratio = 0.05;
        reporter.report_runs(&[Run {
            benchmark_name: "copy_RMS".to_string(),
            report_rms: true,
            real_accumulated_time: ratio / TimeUnit::Nanosecond.multiplier(),
            cpu_accumulated_time: ratio / TimeUnit::Nanosecond.multiplier(),
            time_unit: TimeUnit::Nanosecond,
            ..Run::default()
        }]);
        reporter.finalize();

        let raw = buf.0.lock().unwrap().clone();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let bench = &parsed["benchmarks"][0];
        assert_eq!(bench["run_type"], "RMS");
        assert!((bench["real_time"].as_f64().unwrap() - ratio).abs() < 1e-12);
        assert!((bench["cpu_time"].as_f64().unwrap() - ratio).abs() < 1e-12);
        assert!((bench["rms"].as_f64().unwrap() - ratio).abs() < 1e-12);
    }

    #[test]
    fn error_runs_carry_their_message() {
        let buf = SharedBuf::default();
        let mut reporter = JsonReporter::new(Box::new(buf.clone()));
        reporter.report_runs(&[Run {
            benchmark_name: "broken".to_string(),
            error_occurred: true,
            error_message: "bad".to_string(),
            ..Run::default()
        }]);
        reporter.finalize();

        let raw = buf.0.lock().unwrap().clone();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed["benchmarks"][0]["error_message"], "bad");
    }
}
