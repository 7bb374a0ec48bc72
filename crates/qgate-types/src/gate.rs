use crate::validation::{CompositionError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::Display;

/// Gate decision for one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GateDecision {
    Accept,
    AutoFix,
    Reject,
}

/// Scoring and decision thresholds for the quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Minimum score for an error-free composition to be accepted.
    pub min_accept_score: f64,
    /// Minimum score at which auto-fixing is attempted.
    pub auto_fix_score: f64,
    /// Per-code error penalties; codes absent from the table fall back to
    /// `default_error_penalty`.
    #[serde(default)]
    pub error_penalties: BTreeMap<ErrorCode, f64>,
    pub default_error_penalty: f64,
    pub warning_penalty: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        let mut error_penalties = BTreeMap::new();
        error_penalties.insert(ErrorCode::IllegalCycle, 40.0);
        error_penalties.insert(ErrorCode::CompositionTooLarge, 40.0);
        error_penalties.insert(ErrorCode::UnknownElementType, 30.0);
        error_penalties.insert(ErrorCode::DuplicateId, 20.0);
        error_penalties.insert(ErrorCode::DanglingConnection, 15.0);
        error_penalties.insert(ErrorCode::SelfConnection, 15.0);
        error_penalties.insert(ErrorCode::InvalidConfig, 10.0);
        Self {
            min_accept_score: 80.0,
            auto_fix_score: 60.0,
            error_penalties,
            default_error_penalty: 20.0,
            warning_penalty: 3.0,
        }
    }
}

impl GateThresholds {
    pub fn error_penalty(&self, code: ErrorCode) -> f64 {
        self.error_penalties
            .get(&code)
            .copied()
            .unwrap_or(self.default_error_penalty)
    }
}

/// The kind of deterministic repair applied by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AutoFixKind {
    DropConnection,
    FillDefaultConfig,
    ReassignId,
}

/// One applied repair. Fixes are deterministic and idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFix {
    pub kind: AutoFixKind,
    pub target_id: String,
    pub description: String,
}

/// Result of gating one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub decision: GateDecision,
    /// Quality score in 0–100.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_fixes: Vec<AutoFix>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_issues: Vec<CompositionError>,
}

impl GateResult {
    pub fn accepted(&self) -> bool {
        matches!(self.decision, GateDecision::Accept | GateDecision::AutoFix)
    }

    /// Plain-language summary for end users. Never exposes raw codes.
    pub fn user_summary(&self) -> String {
        match self.decision {
            GateDecision::Accept => "Your tool is ready to use.".to_string(),
            GateDecision::AutoFix => format!(
                "Your tool is ready to use. {} small issue(s) were repaired automatically.",
                self.applied_fixes.len()
            ),
            GateDecision::Reject => {
                if self.remaining_issues.is_empty() {
                    "This tool could not be generated. Please try rephrasing your request."
                        .to_string()
                } else {
                    let mut lines =
                        vec!["This tool could not be generated because:".to_string()];
                    for issue in &self.remaining_issues {
                        lines.push(format!("  - {}", describe_issue(issue)));
                    }
                    lines.join("\n")
                }
            }
        }
    }
}

fn describe_issue(error: &CompositionError) -> String {
    let subject = error
        .offending_id
        .as_deref()
        .map(|id| format!("a part of the tool ({id})"))
        .unwrap_or_else(|| "a part of the tool".to_string());
    match error.code {
        ErrorCode::InvalidConfig => format!("{subject} is missing required settings"),
        ErrorCode::UnknownElementType => format!("{subject} uses an unsupported component"),
        ErrorCode::DanglingConnection => format!("{subject} is wired to something that does not exist"),
        ErrorCode::SelfConnection => format!("{subject} is wired to itself"),
        ErrorCode::IllegalCycle => "some components are wired in a loop".to_string(),
        ErrorCode::CompositionTooLarge => "the tool is too large to run reliably".to_string(),
        ErrorCode::DuplicateId => format!("{subject} appears more than once"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::CompositionError;

    #[test]
    fn penalty_table_falls_back_to_default() {
        let thresholds = GateThresholds {
            error_penalties: BTreeMap::new(),
            ..GateThresholds::default()
        };
        assert_eq!(thresholds.error_penalty(ErrorCode::IllegalCycle), 20.0);
    }

    #[test]
    fn reject_summary_never_contains_raw_codes() {
        let result = GateResult {
            decision: GateDecision::Reject,
            score: 10.0,
            applied_fixes: vec![],
            remaining_issues: vec![CompositionError::new(
                ErrorCode::DanglingConnection,
                "connection references missing element 'el-9'",
                Some("el-2:value -> el-9:data".into()),
            )],
        };
        let summary = result.user_summary();
        assert!(summary.contains("could not be generated"));
        assert!(!summary.contains("dangling_connection"));
    }
}
