//! Benchmark runner: drive a prompt suite through the pipeline and produce
//! a write-once snapshot.
//!
//! Prompts run on a bounded worker pool since each one calls a potentially
//! slow external generator. Every invocation carries an explicit timeout; a
//! timed-out prompt is recorded as a failed result, never dropped from the
//! snapshot.

use anyhow::Result;
use qgate_lib::gate::{gate, FixRegistry};
use qgate_lib::pipeline::{GenerationConstraints, Generator};
use qgate_lib::validator::{validate, CapacityLimits};
use qgate_types::{
    BenchmarkSuiteResult, ElementRegistry, GateDecision, GateThresholds, PerPromptResult,
    PromptCase, PromptScores, PromptSuite,
};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Worker-pool bound for concurrent generator calls.
    pub concurrency: usize,
    /// Per-prompt deadline for the generator.
    pub prompt_timeout: Duration,
    pub pipeline_version: String,
    pub thresholds: GateThresholds,
    pub limits: CapacityLimits,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            prompt_timeout: Duration::from_secs(30),
            pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
            thresholds: GateThresholds::default(),
            limits: CapacityLimits::default(),
        }
    }
}

/// Drives prompt suites through generate → validate → gate.
pub struct BenchmarkRunner {
    generator: Arc<dyn Generator>,
    registry: Arc<ElementRegistry>,
    fixes: Arc<FixRegistry>,
    config: RunnerConfig,
}

impl BenchmarkRunner {
    pub fn new(generator: Arc<dyn Generator>, config: RunnerConfig) -> Self {
        Self {
            generator,
            registry: Arc::new(ElementRegistry::standard()),
            fixes: Arc::new(FixRegistry::standard()),
            config,
        }
    }

    /// Run the full suite and aggregate a snapshot.
    pub async fn run(&self, suite: &PromptSuite) -> Result<BenchmarkSuiteResult> {
        info!(
            suite = %suite.name,
            prompts = suite.prompts.len(),
            concurrency = self.config.concurrency,
            "starting benchmark run"
        );
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));

        let mut handles = Vec::with_capacity(suite.prompts.len());
        for case in suite.prompts.clone() {
            let semaphore = semaphore.clone();
            let generator = self.generator.clone();
            let registry = self.registry.clone();
            let fixes = self.fixes.clone();
            let config = self.config.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closes");
                run_prompt(&case, generator, &registry, &fixes, &config).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await?);
        }

        let total_prompts = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let accepted = results
            .iter()
            .filter(|r| matches!(r.decision, GateDecision::Accept | GateDecision::AutoFix))
            .count();
        let denominator = total_prompts.max(1) as f64;
        let avg_quality_score =
            results.iter().map(|r| r.scores.overall).sum::<f64>() / denominator;
        let avg_duration_ms =
            results.iter().map(|r| r.duration_ms as f64).sum::<f64>() / denominator;

        let snapshot = BenchmarkSuiteResult {
            run_id: Uuid::new_v4().to_string(),
            git_commit: git_metadata(&["rev-parse", "--short", "HEAD"]),
            git_branch: git_metadata(&["rev-parse", "--abbrev-ref", "HEAD"]),
            created_at: chrono::Utc::now(),
            pipeline_version: self.config.pipeline_version.clone(),
            total_prompts,
            passed,
            pass_rate: passed as f64 / denominator,
            avg_quality_score,
            acceptance_rate: accepted as f64 / denominator,
            avg_duration_ms,
            results,
        };
        info!(
            run_id = %snapshot.run_id,
            pass_rate = snapshot.pass_rate,
            avg_score = snapshot.avg_quality_score,
            "benchmark run finished"
        );
        Ok(snapshot)
    }
}

/// Run one prompt: generate under timeout, validate, gate, judge against
/// the rubric.
async fn run_prompt(
    case: &PromptCase,
    generator: Arc<dyn Generator>,
    registry: &ElementRegistry,
    fixes: &FixRegistry,
    config: &RunnerConfig,
) -> PerPromptResult {
    let constraints = GenerationConstraints {
        max_elements: config.limits.max_elements,
        max_connections: config.limits.max_connections,
    };
    let started = Instant::now();

    let generated = tokio::time::timeout(
        config.prompt_timeout,
        generator.generate(&case.prompt, &constraints),
    )
    .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match generated {
        Ok(Ok(composition)) => {
            let validation = validate(&composition, registry, &config.limits);
            let gate_result = match gate(
                &composition,
                &validation,
                &config.thresholds,
                fixes,
                registry,
                &config.limits,
            ) {
                Ok(result) => result,
                Err(err) => {
                    warn!(prompt_id = %case.id, %err, "gate configuration fault");
                    return failed_result(case, duration_ms, "gate_error");
                }
            };

            let mut scores = PromptScores {
                overall: gate_result.score,
                metrics: Default::default(),
            };
            scores
                .metrics
                .insert("errors".into(), validation.errors.len() as f64);
            scores
                .metrics
                .insert("warnings".into(), validation.warnings.len() as f64);
            scores.metrics.insert(
                "applied_fixes".into(),
                gate_result.applied_fixes.len() as f64,
            );

            let accepted = matches!(
                gate_result.decision,
                GateDecision::Accept | GateDecision::AutoFix
            );
            let passed = scores.overall >= case.rubric.min_overall_score
                && (!case.rubric.require_acceptance || accepted);

            let failure_reasons = if passed {
                vec![]
            } else {
                let mut reasons: Vec<String> = gate_result
                    .remaining_issues
                    .iter()
                    .map(|issue| issue.code.to_string())
                    .collect();
                if reasons.is_empty() {
                    reasons.push("score_below_rubric".to_string());
                }
                reasons
            };

            PerPromptResult {
                prompt_id: case.id.clone(),
                passed,
                decision: gate_result.decision,
                scores,
                failure_reasons,
                duration_ms,
            }
        }
        Ok(Err(err)) => {
            warn!(prompt_id = %case.id, %err, "generator fault during benchmark");
            failed_result(case, duration_ms, "generation_error")
        }
        Err(_) => {
            warn!(
                prompt_id = %case.id,
                timeout_ms = config.prompt_timeout.as_millis() as u64,
                "prompt timed out"
            );
            failed_result(case, duration_ms, "timeout")
        }
    }
}

fn failed_result(case: &PromptCase, duration_ms: u64, reason: &str) -> PerPromptResult {
    PerPromptResult {
        prompt_id: case.id.clone(),
        passed: false,
        decision: GateDecision::Reject,
        scores: PromptScores::default(),
        failure_reasons: vec![reason.to_string()],
        duration_ms,
    }
}

fn git_metadata(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
