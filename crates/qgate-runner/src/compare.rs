//! Snapshot comparison: diff two benchmark runs and decide whether the
//! current one is a regression.
//!
//! Pure and synchronous: it operates only on two already-materialized
//! snapshots and needs no locking.

use qgate_types::{
    BenchmarkComparison, BenchmarkSuiteResult, ComparisonTolerance, PromptRegression,
};

/// Compare the current run against a baseline.
///
/// Per-prompt, pass→fail is a named regression and fail→pass a named
/// improvement; prompts absent from the baseline are reported as new and
/// excluded from both tallies.
pub fn compare(
    current: &BenchmarkSuiteResult,
    baseline: &BenchmarkSuiteResult,
    tolerance: &ComparisonTolerance,
) -> BenchmarkComparison {
    let mut regressions = Vec::new();
    let mut improvements = Vec::new();
    let mut new_prompts = Vec::new();

    for result in &current.results {
        let Some(base) = baseline.result_for(&result.prompt_id) else {
            new_prompts.push(result.prompt_id.clone());
            continue;
        };
        let diff = PromptRegression {
            prompt_id: result.prompt_id.clone(),
            baseline_score: base.scores.overall,
            current_score: result.scores.overall,
        };
        if base.passed && !result.passed {
            regressions.push(diff);
        } else if !base.passed && result.passed {
            improvements.push(diff);
        }
    }

    let score_change = current.avg_quality_score - baseline.avg_quality_score;
    let pass_rate_change = current.pass_rate - baseline.pass_rate;
    let acceptance_rate_change = current.acceptance_rate - baseline.acceptance_rate;
    let duration_change_ms = current.avg_duration_ms - baseline.avg_duration_ms;

    let score_dropped = score_change < -tolerance.score_drop;
    let pass_rate_dropped = pass_rate_change < -tolerance.pass_rate_drop;
    let duration_regressed =
        duration_change_ms > baseline.avg_duration_ms * tolerance.duration_increase_pct;

    let is_regression = !regressions.is_empty() || score_dropped || pass_rate_dropped;

    // Reason priority: named per-prompt regressions, then score drop, then
    // pass-rate drop, then duration. A duration-only reason can accompany
    // `is_regression == false`; it flags a slowdown without failing the
    // comparison.
    let regression_reason = if !regressions.is_empty() {
        let ids: Vec<&str> = regressions.iter().map(|r| r.prompt_id.as_str()).collect();
        Some(format!(
            "{} prompt(s) regressed from pass to fail: {}",
            regressions.len(),
            ids.join(", ")
        ))
    } else if score_dropped {
        Some(format!(
            "average quality score dropped by {:.1} (tolerance {:.1})",
            -score_change, tolerance.score_drop
        ))
    } else if pass_rate_dropped {
        Some(format!(
            "pass rate dropped by {:.1}% (tolerance {:.1}%)",
            -pass_rate_change * 100.0,
            tolerance.pass_rate_drop * 100.0
        ))
    } else if duration_regressed {
        Some(format!(
            "average duration grew by {:.0}ms",
            duration_change_ms
        ))
    } else {
        None
    };

    BenchmarkComparison {
        score_change,
        pass_rate_change,
        acceptance_rate_change,
        duration_change_ms,
        regressions,
        improvements,
        new_prompts,
        is_regression,
        regression_reason,
    }
}
