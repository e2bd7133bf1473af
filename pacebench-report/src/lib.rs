//! Pacebench Report - Run Records and Reporters
//!
//! Everything downstream of a measured trial lives here: the finalized
//! [`Run`] record, the [`Reporter`] trait the orchestrator drives, and the
//! console, JSON, and CSV implementations.

mod console;
mod csv;
mod json;
mod reporter;
mod run;

pub use console::ConsoleReporter;
pub use csv::CsvReporter;
pub use json::JsonReporter;
pub use reporter::{Context, Reporter};
pub use run::{AllocationReport, Run};
