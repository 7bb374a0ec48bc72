//! Presentation layer over an already-computed comparison.
//!
//! Rendering never alters the comparison; every format reads the same
//! fields and differs only in shape.

use ascii_tree::{write_tree, Tree};
use clap::ValueEnum;
use qgate_types::BenchmarkComparison;

/// Output format for the `compare` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Summary,
    Detailed,
    Markdown,
    Json,
}

/// Render a comparison in the requested format.
pub fn render(comparison: &BenchmarkComparison, format: ReportFormat) -> String {
    match format {
        ReportFormat::Summary => render_summary(comparison),
        ReportFormat::Detailed => render_detailed(comparison),
        ReportFormat::Markdown => render_markdown(comparison),
        ReportFormat::Json => serde_json::to_string_pretty(comparison)
            .expect("comparison serializes to plain JSON"),
    }
}

fn signed(value: f64, unit: &str) -> String {
    format!("{value:+.1}{unit}")
}

fn render_summary(comparison: &BenchmarkComparison) -> String {
    let status = if comparison.is_regression {
        "❌ REGRESSION"
    } else {
        "✅ OK"
    };
    let mut lines = vec![
        format!("Benchmark comparison: {status}"),
        format!("  score:       {}", signed(comparison.score_change, "")),
        format!(
            "  pass rate:   {}",
            signed(comparison.pass_rate_change * 100.0, "%")
        ),
        format!(
            "  acceptance:  {}",
            signed(comparison.acceptance_rate_change * 100.0, "%")
        ),
        format!(
            "  duration:    {}",
            signed(comparison.duration_change_ms, "ms")
        ),
        format!(
            "  regressions: {}, improvements: {}, new prompts: {}",
            comparison.regressions.len(),
            comparison.improvements.len(),
            comparison.new_prompts.len()
        ),
    ];
    if let Some(reason) = &comparison.regression_reason {
        lines.push(format!("  reason: {reason}"));
    }
    lines.join("\n")
}

fn render_detailed(comparison: &BenchmarkComparison) -> String {
    let status_icon = if comparison.is_regression { "❌" } else { "✅" };
    let root_label = format!(
        "{} Benchmark comparison (score {}, pass rate {})",
        status_icon,
        signed(comparison.score_change, ""),
        signed(comparison.pass_rate_change * 100.0, "%")
    );

    let mut children = vec![Tree::Leaf(vec![
        format!("acceptance: {}", signed(comparison.acceptance_rate_change * 100.0, "%")),
        format!("duration:   {}", signed(comparison.duration_change_ms, "ms")),
    ])];

    if !comparison.regressions.is_empty() {
        let leaves = comparison
            .regressions
            .iter()
            .map(|r| {
                format!(
                    "❌ {} ({:.1} -> {:.1})",
                    r.prompt_id, r.baseline_score, r.current_score
                )
            })
            .collect();
        children.push(Tree::Node(
            format!("Regressions ({})", comparison.regressions.len()),
            vec![Tree::Leaf(leaves)],
        ));
    }
    if !comparison.improvements.is_empty() {
        let leaves = comparison
            .improvements
            .iter()
            .map(|r| {
                format!(
                    "✅ {} ({:.1} -> {:.1})",
                    r.prompt_id, r.baseline_score, r.current_score
                )
            })
            .collect();
        children.push(Tree::Node(
            format!("Improvements ({})", comparison.improvements.len()),
            vec![Tree::Leaf(leaves)],
        ));
    }
    if !comparison.new_prompts.is_empty() {
        children.push(Tree::Node(
            format!("New prompts ({})", comparison.new_prompts.len()),
            vec![Tree::Leaf(comparison.new_prompts.clone())],
        ));
    }
    if let Some(reason) = &comparison.regression_reason {
        children.push(Tree::Leaf(vec![format!("Reason: {reason}")]));
    }

    let tree = Tree::Node(root_label, children);
    let mut buffer = String::new();
    write_tree(&mut buffer, &tree).expect("writing to a String cannot fail");
    buffer
}

fn render_markdown(comparison: &BenchmarkComparison) -> String {
    let status = if comparison.is_regression {
        "❌ regression"
    } else {
        "✅ no regression"
    };
    let mut out = vec![
        "## Benchmark comparison".to_string(),
        String::new(),
        format!("**Status:** {status}"),
        String::new(),
        "| Metric | Change |".to_string(),
        "|---|---|".to_string(),
        format!("| Quality score | {} |", signed(comparison.score_change, "")),
        format!(
            "| Pass rate | {} |",
            signed(comparison.pass_rate_change * 100.0, "%")
        ),
        format!(
            "| Acceptance rate | {} |",
            signed(comparison.acceptance_rate_change * 100.0, "%")
        ),
        format!(
            "| Avg duration | {} |",
            signed(comparison.duration_change_ms, "ms")
        ),
    ];

    if let Some(reason) = &comparison.regression_reason {
        out.push(String::new());
        out.push(format!("**Reason:** {reason}"));
    }
    if !comparison.regressions.is_empty() {
        out.push(String::new());
        out.push("### Regressions".to_string());
        for r in &comparison.regressions {
            out.push(format!(
                "- `{}`: {:.1} -> {:.1}",
                r.prompt_id, r.baseline_score, r.current_score
            ));
        }
    }
    if !comparison.improvements.is_empty() {
        out.push(String::new());
        out.push("### Improvements".to_string());
        for r in &comparison.improvements {
            out.push(format!(
                "- `{}`: {:.1} -> {:.1}",
                r.prompt_id, r.baseline_score, r.current_score
            ));
        }
    }
    if !comparison.new_prompts.is_empty() {
        out.push(String::new());
        out.push("### New prompts".to_string());
        for id in &comparison.new_prompts {
            out.push(format!("- `{id}`"));
        }
    }
    out.join("\n")
}
