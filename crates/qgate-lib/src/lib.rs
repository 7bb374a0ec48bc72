//! Core of the qgate pipeline.
//!
//! Candidate compositions flow through the validator and the quality gate
//! synchronously; accepted and rejected attempts alike are persisted by the
//! generation tracker, later user edits are aggregated by the edit tracker,
//! and the failure classifier folds history into trend statistics. The
//! external generator and the durable store are collaborators behind traits
//! so every stage is testable with no global state.

pub mod classifier;
pub mod clock;
pub mod error;
pub mod gate;
pub mod mock;
pub mod pipeline;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod validator;

pub use classifier::{aggregate, classify_error, classify_warning};
pub use clock::{Clock, SystemClock};
pub use error::{PipelineError, Result};
pub use gate::{gate, FixRegistry};
pub use mock::MockGenerator;
pub use pipeline::{GenerationConstraints, GenerationPipeline, Generator, GeneratorError, PipelineOutcome};
pub use storage::{EditStore, GenerationStore};
pub use store::memory::MemoryStore;
pub use tracker::edits::EditTracker;
pub use tracker::generation::{GenerationTracker, NewGeneration};
pub use validator::{validate, CapacityLimits};
