use crate::failure::FailureType;
use crate::gate::GateResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Provenance record for one generation attempt. Immutable once written;
/// exactly one record per `generation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationTrackingData {
    /// Caller-supplied, globally unique.
    pub generation_id: String,
    pub prompt_text: String,
    pub pipeline_version: String,
    pub created_at: DateTime<Utc>,
    pub gate_result: GateResult,
    pub duration_ms: u64,
    /// Set only for collaborator faults (generator error / timeout), so
    /// infrastructure failures stay distinguishable from bad output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureType>,
}

/// The kind of change a user made to an accepted composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditType {
    Add,
    Remove,
    Modify,
    Move,
    Reconnect,
}

/// One user edit applied after acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub edit_type: EditType,
    /// Element type the edit touched (e.g. "slider").
    pub element_type: String,
    /// The concrete element or connection instance.
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
}

/// Terminal outcome of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinalOutcome {
    /// User kept the generation as delivered.
    Kept,
    /// User kept it after making changes.
    Edited,
    /// User threw the generation away.
    Discarded,
}

/// Aggregated edits for one generation, the gold signal of generation
/// quality. At most one record per generation; mutable until completed,
/// then frozen forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditTrackingData {
    pub generation_id: String,
    pub edits: Vec<Edit>,
    pub edit_count: u64,
    /// Elapsed from acceptance to the first edit.
    pub time_to_first_edit_ms: u64,
    /// Elapsed from acceptance to the latest edit.
    pub total_edit_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_outcome: Option<FinalOutcome>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl EditTrackingData {
    pub fn is_completed(&self) -> bool {
        self.final_outcome.is_some()
    }
}
