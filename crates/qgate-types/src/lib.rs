//! Shared data model for the qgate pipeline.
//!
//! Everything in this crate is a plain serde record: compositions and their
//! element-type registry, validation findings, gate results, tracking
//! records, and benchmark snapshots. No I/O and no async; the stages in
//! `qgate-lib` and `qgate-runner` own the behavior.

pub mod benchmark;
pub mod composition;
pub mod failure;
pub mod gate;
pub mod registry;
pub mod tracking;
pub mod validation;

pub use benchmark::*;
pub use composition::*;
pub use failure::*;
pub use gate::*;
pub use registry::*;
pub use tracking::*;
pub use validation::*;
