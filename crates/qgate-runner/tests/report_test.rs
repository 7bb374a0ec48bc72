//! Report rendering is pure presentation over a computed comparison.

use qgate_runner::report::{render, ReportFormat};
use qgate_types::{BenchmarkComparison, PromptRegression};
use rstest::rstest;

fn comparison() -> BenchmarkComparison {
    BenchmarkComparison {
        score_change: -6.5,
        pass_rate_change: -0.1,
        acceptance_rate_change: -0.05,
        duration_change_ms: 240.0,
        regressions: vec![PromptRegression {
            prompt_id: "P-7".to_string(),
            baseline_score: 95.0,
            current_score: 40.0,
        }],
        improvements: vec![],
        new_prompts: vec!["P-NEW".to_string()],
        is_regression: true,
        regression_reason: Some("1 prompt(s) regressed from pass to fail: P-7".to_string()),
    }
}

#[rstest]
#[case(ReportFormat::Summary)]
#[case(ReportFormat::Detailed)]
#[case(ReportFormat::Markdown)]
#[case(ReportFormat::Json)]
fn rendering_never_alters_the_comparison(#[case] format: ReportFormat) {
    let before = comparison();
    let output = render(&before, format);
    assert!(!output.is_empty());
    assert_eq!(before, comparison());
}

#[test]
fn json_output_round_trips() {
    let original = comparison();
    let json = render(&original, ReportFormat::Json);
    let parsed: BenchmarkComparison = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn every_format_names_the_regressed_prompt() {
    let report = comparison();
    for format in [
        ReportFormat::Summary,
        ReportFormat::Detailed,
        ReportFormat::Markdown,
        ReportFormat::Json,
    ] {
        let output = render(&report, format);
        assert!(output.contains("P-7"), "{format:?} output misses P-7");
    }
}
