//! Benchmark runner, snapshot comparator, and report rendering for the
//! qgate pipeline.

pub mod compare;
pub mod report;
pub mod runner;
pub mod suite;

pub use compare::compare;
pub use report::{render, ReportFormat};
pub use runner::{BenchmarkRunner, RunnerConfig};
pub use suite::{load_snapshot, load_suite, save_snapshot};
