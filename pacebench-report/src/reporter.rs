//! The reporter interface consumed by the orchestrator.

use chrono::{DateTime, Utc};

use crate::run::Run;

/// Header information shared with every reporter before any run is emitted.
#[derive(Debug, Clone)]
pub struct Context {
    pub executable_name: String,
    /// Width of the name column, computed by the orchestrator from the
    /// longest benchmark name (and statistic tag, when repetitions are on).
    pub name_field_width: usize,
    pub timestamp: DateTime<Utc>,
}

impl Context {
    pub fn new(executable_name: impl Into<String>, name_field_width: usize) -> Self {
        Self {
            executable_name: executable_name.into(),
            name_field_width,
            timestamp: Utc::now(),
        }
    }
}

/// Consumer of finalized [`Run`] records.
///
/// The orchestrator calls `report_context` once up front (returning `false`
/// aborts the whole run), `report_runs` after each benchmark, `flush` after
/// every emission so output stays timely on block-buffered streams, and
/// `finalize` at the end.
pub trait Reporter {
    fn report_context(&mut self, context: &Context) -> bool;
    fn report_runs(&mut self, runs: &[Run]);
    fn finalize(&mut self) {}
    fn flush(&mut self) {}
}
