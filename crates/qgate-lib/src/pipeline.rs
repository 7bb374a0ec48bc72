//! The end-to-end generation pipeline boundary.
//!
//! Prompt in, tracked gate outcome out. The external generator is a
//! collaborator behind a trait; its faults (errors, timeouts) are converted
//! right here into recorded reject outcomes, never propagated raw into
//! tracking records or to the caller.

use crate::clock::Clock;
use crate::error::Result;
use crate::gate::{gate, FixRegistry};
use crate::storage::GenerationStore;
use crate::tracker::generation::{GenerationTracker, NewGeneration};
use crate::validator::{validate, CapacityLimits};
use async_trait::async_trait;
use qgate_types::{
    Composition, ElementRegistry, FailureType, GateDecision, GateResult, GateThresholds,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Constraints handed to the generator alongside the prompt.
#[derive(Debug, Clone)]
pub struct GenerationConstraints {
    pub max_elements: usize,
    pub max_connections: usize,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        let limits = CapacityLimits::default();
        Self {
            max_elements: limits.max_elements,
            max_connections: limits.max_connections,
        }
    }
}

/// Faults the external generator may raise.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("generator failed: {0}")]
    Failed(String),
    #[error("generator returned malformed output: {0}")]
    Malformed(String),
}

/// The external generative model.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        constraints: &GenerationConstraints,
    ) -> std::result::Result<Composition, GeneratorError>;
}

/// What the caller (and ultimately the end user) sees from one attempt.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub generation_id: String,
    pub decision: GateDecision,
    /// Plain-language summary; raw codes never reach end users.
    pub summary: String,
    pub gate_result: GateResult,
    /// The composition as delivered (post-fix), when accepted.
    pub composition: Option<Composition>,
}

/// Configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub pipeline_version: String,
    pub generator_timeout: Duration,
    pub thresholds: GateThresholds,
    pub limits: CapacityLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
            generator_timeout: Duration::from_secs(30),
            thresholds: GateThresholds::default(),
            limits: CapacityLimits::default(),
        }
    }
}

/// Generator → validator → gate → tracker, wired by explicit injection.
pub struct GenerationPipeline {
    generator: Arc<dyn Generator>,
    registry: ElementRegistry,
    fixes: FixRegistry,
    tracker: GenerationTracker,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl GenerationPipeline {
    pub fn new(
        generator: Arc<dyn Generator>,
        registry: ElementRegistry,
        fixes: FixRegistry,
        store: Arc<dyn GenerationStore>,
        clock: Arc<dyn Clock>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            registry,
            fixes,
            tracker: GenerationTracker::new(store, clock.clone()),
            clock,
            config,
        }
    }

    pub fn tracker(&self) -> &GenerationTracker {
        &self.tracker
    }

    /// Run one prompt through generate → validate → gate and track the
    /// outcome under the caller-supplied id.
    pub async fn process(&self, generation_id: &str, prompt: &str) -> Result<PipelineOutcome> {
        let constraints = GenerationConstraints {
            max_elements: self.config.limits.max_elements,
            max_connections: self.config.limits.max_connections,
        };
        let started = self.clock.now();

        let generated = tokio::time::timeout(
            self.config.generator_timeout,
            self.generator.generate(prompt, &constraints),
        )
        .await;

        let elapsed_ms = (self.clock.now() - started).num_milliseconds().max(0) as u64;

        let (gate_result, failure, composition) = match generated {
            Ok(Ok(composition)) => {
                let validation = validate(&composition, &self.registry, &self.config.limits);
                let result = gate(
                    &composition,
                    &validation,
                    &self.config.thresholds,
                    &self.fixes,
                    &self.registry,
                    &self.config.limits,
                )?;
                let delivered = result.accepted().then_some(composition);
                (result, None, delivered)
            }
            Ok(Err(err)) => {
                warn!(generation_id, %err, "generator fault, converting to reject");
                (
                    collaborator_reject(),
                    Some(FailureType::GenerationError),
                    None,
                )
            }
            Err(_) => {
                error!(
                    generation_id,
                    timeout_ms = self.config.generator_timeout.as_millis() as u64,
                    "generator timed out, converting to reject"
                );
                (collaborator_reject(), Some(FailureType::Timeout), None)
            }
        };

        let tracked = self
            .tracker
            .record(
                NewGeneration {
                    generation_id: generation_id.to_string(),
                    prompt_text: prompt.to_string(),
                    pipeline_version: self.config.pipeline_version.clone(),
                    duration_ms: elapsed_ms,
                    failure,
                },
                gate_result,
            )
            .await?;

        info!(
            generation_id,
            decision = %tracked.gate_result.decision,
            "pipeline attempt finished"
        );
        Ok(PipelineOutcome {
            generation_id: generation_id.to_string(),
            decision: tracked.gate_result.decision,
            summary: tracked.gate_result.user_summary(),
            gate_result: tracked.gate_result,
            composition,
        })
    }
}

/// The reject recorded for a collaborator fault: score 0 and no structural
/// issues, since the composition never existed.
fn collaborator_reject() -> GateResult {
    GateResult {
        decision: GateDecision::Reject,
        score: 0.0,
        applied_fixes: vec![],
        remaining_issues: vec![],
    }
}
