use crate::gate::GateDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pass criteria for one benchmark prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRubric {
    /// Minimum overall score for the prompt to count as passed.
    pub min_overall_score: f64,
    /// When true, the gate must have accepted (directly or via auto-fix).
    #[serde(default = "default_require_acceptance")]
    pub require_acceptance: bool,
}

fn default_require_acceptance() -> bool {
    true
}

impl Default for PassRubric {
    fn default() -> Self {
        Self {
            min_overall_score: 80.0,
            require_acceptance: true,
        }
    }
}

/// One prompt in the fixed benchmark suite. Deserialized from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCase {
    /// Unique identifier (e.g. "DASHBOARD-SIMPLE-001").
    pub id: String,
    /// The natural-language prompt handed to the generator.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rubric: PassRubric,
}

/// A named set of prompt cases run together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSuite {
    pub name: String,
    pub prompts: Vec<PromptCase>,
}

/// Scores for one prompt run. `overall` drives the rubric; `metrics` holds
/// any additional named dimensions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PromptScores {
    pub overall: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
}

/// Outcome of one prompt in a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPromptResult {
    pub prompt_id: String,
    pub passed: bool,
    pub decision: GateDecision,
    pub scores: PromptScores,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_reasons: Vec<String>,
    pub duration_ms: u64,
}

/// Write-once snapshot of one full benchmark run. Serializes to plain JSON
/// so snapshots stay diffable across pipeline versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSuiteResult {
    pub run_id: String,
    pub git_commit: String,
    pub git_branch: String,
    pub created_at: DateTime<Utc>,
    pub pipeline_version: String,
    pub total_prompts: usize,
    pub passed: usize,
    /// Fraction in 0–1.
    pub pass_rate: f64,
    pub avg_quality_score: f64,
    /// Fraction of prompts the gate accepted (directly or via auto-fix).
    pub acceptance_rate: f64,
    pub avg_duration_ms: f64,
    pub results: Vec<PerPromptResult>,
}

impl BenchmarkSuiteResult {
    pub fn result_for(&self, prompt_id: &str) -> Option<&PerPromptResult> {
        self.results.iter().find(|r| r.prompt_id == prompt_id)
    }
}

/// A prompt whose pass/fail status flipped between two runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRegression {
    pub prompt_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
}

/// Noise tolerance for regression detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTolerance {
    /// Allowed average-score drop before flagging.
    pub score_drop: f64,
    /// Allowed pass-rate drop (fraction in 0–1) before flagging.
    pub pass_rate_drop: f64,
    /// Allowed average-duration increase, as a fraction of baseline.
    pub duration_increase_pct: f64,
}

impl Default for ComparisonTolerance {
    fn default() -> Self {
        Self {
            score_drop: 2.0,
            pass_rate_drop: 0.02,
            duration_increase_pct: 0.25,
        }
    }
}

/// Diff of two benchmark snapshots. Always computed on demand, never
/// persisted as primary state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// current − baseline, positive is better.
    pub score_change: f64,
    pub pass_rate_change: f64,
    pub acceptance_rate_change: f64,
    /// current − baseline in milliseconds, positive is slower.
    pub duration_change_ms: f64,
    /// Prompts that passed in the baseline and failed in the current run.
    pub regressions: Vec<PromptRegression>,
    /// Prompts that failed in the baseline and passed in the current run.
    pub improvements: Vec<PromptRegression>,
    /// Prompts absent from the baseline; excluded from both tallies.
    pub new_prompts: Vec<String>,
    pub is_regression: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regression_reason: Option<String>,
}
