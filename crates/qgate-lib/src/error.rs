//! Pipeline error handling.
//!
//! Structural and policy findings are ordinary return values
//! ([`qgate_types::ValidationResult`], [`qgate_types::GateResult`]); only
//! collaborator and configuration faults travel as `Err`.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A second `record` for an already-tracked generation id.
    #[error("duplicate generation: '{id}' is already recorded")]
    DuplicateGeneration { id: String },

    /// An edit or completion referenced a generation that was never tracked.
    #[error("generation not found: '{id}'")]
    GenerationNotFound { id: String },

    /// An edit arrived after the session was completed. Completion wins.
    #[error("session closed: edits for '{id}' are frozen")]
    SessionClosed { id: String },

    /// Completing a session that was already completed.
    #[error("session for '{id}' was already completed")]
    AlreadyCompleted { id: String },

    /// Two registered auto-fixes addressed the same target. A configuration
    /// bug in the fix registry, not a runtime condition to resolve.
    #[error("auto-fix conflict on target '{target_id}'")]
    FixConflict { target_id: String },

    /// Storage collaborator fault.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generator collaborator fault, already converted at the boundary.
    #[error("generator error: {message}")]
    Generation { message: String },

    /// The generator exceeded its deadline.
    #[error("generator timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn duplicate_generation(id: impl Into<String>) -> Self {
        Self::DuplicateGeneration { id: id.into() }
    }

    pub fn generation_not_found(id: impl Into<String>) -> Self {
        Self::GenerationNotFound { id: id.into() }
    }

    pub fn session_closed(id: impl Into<String>) -> Self {
        Self::SessionClosed { id: id.into() }
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn serialization<S: Into<String>>(message: S, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }
}
