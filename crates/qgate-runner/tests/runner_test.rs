//! Offline benchmark runs against the deterministic mock generator.

use async_trait::async_trait;
use qgate_lib::pipeline::{GenerationConstraints, Generator, GeneratorError};
use qgate_lib::MockGenerator;
use qgate_runner::runner::{BenchmarkRunner, RunnerConfig};
use qgate_types::{Composition, GateDecision, PassRubric, PromptCase, PromptSuite};
use std::sync::Arc;
use std::time::Duration;

fn case(id: &str, prompt: &str) -> PromptCase {
    PromptCase {
        id: id.to_string(),
        prompt: prompt.to_string(),
        tags: vec![],
        rubric: PassRubric::default(),
    }
}

fn suite(prompts: Vec<PromptCase>) -> PromptSuite {
    PromptSuite {
        name: "offline".to_string(),
        prompts,
    }
}

#[tokio::test]
async fn mixed_suite_aggregates_every_prompt() {
    let runner = BenchmarkRunner::new(Arc::new(MockGenerator::new()), RunnerConfig::default());
    let suite = suite(vec![
        case("CLEAN-001", "build a squared-value plotter"),
        case("FIX-001", "a plotter with a broken wire"),
        case("CYCLE-001", "a tool with a tangled loop inside"),
        case("GEN-ERR-001", "a dashboard from an unavailable model"),
    ]);

    let snapshot = runner.run(&suite).await.unwrap();
    assert_eq!(snapshot.total_prompts, 4);
    assert_eq!(snapshot.results.len(), 4);

    let clean = snapshot.result_for("CLEAN-001").unwrap();
    assert!(clean.passed);
    assert_eq!(clean.decision, GateDecision::Accept);

    let fixed = snapshot.result_for("FIX-001").unwrap();
    assert!(fixed.passed);
    assert_eq!(fixed.decision, GateDecision::AutoFix);
    assert_eq!(fixed.scores.metrics.get("applied_fixes"), Some(&1.0));

    let cycle = snapshot.result_for("CYCLE-001").unwrap();
    assert!(!cycle.passed);
    assert_eq!(cycle.decision, GateDecision::Reject);
    assert!(cycle
        .failure_reasons
        .iter()
        .any(|r| r == "illegal_cycle"));

    let generator_fault = snapshot.result_for("GEN-ERR-001").unwrap();
    assert!(!generator_fault.passed);
    assert_eq!(
        generator_fault.failure_reasons,
        vec!["generation_error".to_string()]
    );

    assert_eq!(snapshot.passed, 2);
    assert!((snapshot.pass_rate - 0.5).abs() < 1e-9);
    assert!((snapshot.acceptance_rate - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn same_suite_yields_identical_scores() {
    let runner = BenchmarkRunner::new(Arc::new(MockGenerator::new()), RunnerConfig::default());
    let suite = suite(vec![
        case("CLEAN-001", "build an interest calculator"),
        case("FIX-001", "a plotter with a broken wire"),
    ]);

    let first = runner.run(&suite).await.unwrap();
    let second = runner.run(&suite).await.unwrap();
    assert_ne!(first.run_id, second.run_id);
    for (a, b) in first.results.iter().zip(second.results.iter()) {
        assert_eq!(a.prompt_id, b.prompt_id);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.scores.overall, b.scores.overall);
    }
}

struct HangingGenerator;

#[async_trait]
impl Generator for HangingGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _constraints: &GenerationConstraints,
    ) -> Result<Composition, GeneratorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!()
    }
}

#[tokio::test(start_paused = true)]
async fn timed_out_prompt_is_recorded_as_failure_not_dropped() {
    let runner = BenchmarkRunner::new(
        Arc::new(HangingGenerator),
        RunnerConfig {
            prompt_timeout: Duration::from_millis(100),
            ..RunnerConfig::default()
        },
    );
    let suite = suite(vec![case("SLOW-001", "anything at all")]);

    let snapshot = runner.run(&suite).await.unwrap();
    assert_eq!(snapshot.total_prompts, 1);
    let slow = snapshot.result_for("SLOW-001").unwrap();
    assert!(!slow.passed);
    assert_eq!(slow.decision, GateDecision::Reject);
    assert_eq!(slow.failure_reasons, vec!["timeout".to_string()]);
}
