use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Structural error codes. Errors invalidate a composition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    /// Required config missing or value outside the declared domain.
    InvalidConfig,
    /// Element names a `type_id` with no registered descriptor.
    UnknownElementType,
    /// Connection endpoint references a missing element or undeclared port.
    DanglingConnection,
    /// Connection from an element back to itself.
    SelfConnection,
    /// Cycle through non-reentrant element types.
    IllegalCycle,
    /// Element or connection count over the capacity limit.
    CompositionTooLarge,
    /// Two elements share an id.
    DuplicateId,
}

/// Soft finding codes. Warnings never invalidate a composition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarningCode {
    EmptyComposition,
    /// An output port with nothing wired to it.
    DeadOutput,
    /// The same source/target pair wired twice.
    DuplicateConnection,
}

/// One structural error, with the id of the offending element or connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_id: Option<String>,
    /// Unfixable errors force a reject regardless of score.
    #[serde(default)]
    pub unfixable: bool,
}

impl CompositionError {
    pub fn new(code: ErrorCode, message: impl Into<String>, offending_id: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            offending_id,
            unfixable: false,
        }
    }

    pub fn unfixable(
        code: ErrorCode,
        message: impl Into<String>,
        offending_id: Option<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            offending_id,
            unfixable: true,
        }
    }
}

/// One soft finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionWarning {
    pub code: WarningCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_id: Option<String>,
}

impl CompositionWarning {
    pub fn new(code: WarningCode, message: impl Into<String>, offending_id: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            offending_id,
        }
    }
}

/// Outcome of a full validation pass. All findings are accumulated; the
/// validator never stops at the first failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<CompositionError>,
    pub warnings: Vec<CompositionWarning>,
}

impl ValidationResult {
    pub fn new(errors: Vec<CompositionError>, warnings: Vec<CompositionWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    pub fn has_unfixable_error(&self) -> bool {
        self.errors.iter().any(|e| e.unfixable)
    }
}
