//! Append-only provenance tracking, one record per generation attempt.
//!
//! Records are write-once: the store's atomic create-if-absent guarantees
//! first-writer-wins under races, and a duplicate id is an error, never an
//! overwrite. Aggregate metrics are folded over history on demand; there
//! are no live counters to drift.

use crate::clock::Clock;
use crate::error::{PipelineError, Result};
use crate::storage::GenerationStore;
use qgate_types::{FailureType, GateResult, GenerationTrackingData};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for one tracking record.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub generation_id: String,
    pub prompt_text: String,
    pub pipeline_version: String,
    pub duration_ms: u64,
    /// Collaborator fault marker; `None` for ordinary gate outcomes.
    pub failure: Option<FailureType>,
}

/// Tracks generation attempts through an injected store and clock.
pub struct GenerationTracker {
    store: Arc<dyn GenerationStore>,
    clock: Arc<dyn Clock>,
}

impl GenerationTracker {
    pub fn new(store: Arc<dyn GenerationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persist the outcome of one generation attempt.
    ///
    /// Fails with [`PipelineError::DuplicateGeneration`] when the id is
    /// already tracked; the stored record is left unchanged.
    pub async fn record(
        &self,
        input: NewGeneration,
        gate_result: GateResult,
    ) -> Result<GenerationTrackingData> {
        let data = GenerationTrackingData {
            generation_id: input.generation_id,
            prompt_text: input.prompt_text,
            pipeline_version: input.pipeline_version,
            created_at: self.clock.now(),
            gate_result,
            duration_ms: input.duration_ms,
            failure: input.failure,
        };

        if !self.store.put_if_absent(&data).await? {
            warn!(generation_id = %data.generation_id, "duplicate generation record rejected");
            return Err(PipelineError::duplicate_generation(data.generation_id));
        }
        info!(
            generation_id = %data.generation_id,
            decision = %data.gate_result.decision,
            score = data.gate_result.score,
            "generation recorded"
        );
        Ok(data)
    }

    pub async fn get(&self, generation_id: &str) -> Result<Option<GenerationTrackingData>> {
        self.store.get(generation_id).await
    }

    /// Fraction of the last `window` attempts the gate accepted.
    pub async fn acceptance_rate(&self, window: usize) -> Result<f64> {
        let records = self.store.recent(window).await?;
        if records.is_empty() {
            return Ok(0.0);
        }
        let accepted = records
            .iter()
            .filter(|r| r.gate_result.accepted())
            .count();
        Ok(accepted as f64 / records.len() as f64)
    }

    /// Mean gate score over the last `window` attempts.
    pub async fn average_score(&self, window: usize) -> Result<f64> {
        let records = self.store.recent(window).await?;
        if records.is_empty() {
            return Ok(0.0);
        }
        let sum: f64 = records.iter().map(|r| r.gate_result.score).sum();
        Ok(sum / records.len() as f64)
    }

    /// Mean end-to-end duration over the last `window` attempts.
    pub async fn average_duration_ms(&self, window: usize) -> Result<f64> {
        let records = self.store.recent(window).await?;
        if records.is_empty() {
            return Ok(0.0);
        }
        let sum: u64 = records.iter().map(|r| r.duration_ms).sum();
        Ok(sum as f64 / records.len() as f64)
    }
}
