//! Edit-session tracking, the gold signal of generation quality.
//!
//! Per-generation state machine: `no-edits -> editing -> completed`. The
//! record is created on the first edit, stays mutable while the user works,
//! and freezes forever on the explicit completion signal. A late edit racing
//! the completion resolves deterministically: completion wins, the edit gets
//! a typed error.

use crate::clock::Clock;
use crate::error::{PipelineError, Result};
use crate::storage::{EditStore, GenerationStore};
use qgate_types::{Edit, EditTrackingData, FinalOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Tracks user edits per generation through injected stores and clock.
pub struct EditTracker {
    edit_store: Arc<dyn EditStore>,
    generation_store: Arc<dyn GenerationStore>,
    clock: Arc<dyn Clock>,
    /// One lock per generation id: a single editing session emits edits in
    /// rapid succession and updates must not interleave. Distinct ids stay
    /// fully independent.
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EditTracker {
    pub fn new(
        edit_store: Arc<dyn EditStore>,
        generation_store: Arc<dyn GenerationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            edit_store,
            generation_store,
            clock,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn session_lock(&self, generation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks
            .entry(generation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record one user edit.
    ///
    /// The first edit creates the session record and starts
    /// `time_to_first_edit_ms` from the generation's acceptance time. Edits
    /// after completion fail with [`PipelineError::SessionClosed`] and leave
    /// the stored record unchanged.
    pub async fn record_edit(&self, generation_id: &str, edit: Edit) -> Result<EditTrackingData> {
        let lock = self.session_lock(generation_id).await;
        let _guard = lock.lock().await;

        let Some(generation) = self.generation_store.get(generation_id).await? else {
            return Err(PipelineError::generation_not_found(generation_id));
        };

        let now = self.clock.now();
        let elapsed_ms = (now - generation.created_at).num_milliseconds().max(0) as u64;

        let mut data = match self.edit_store.get(generation_id).await? {
            Some(existing) => {
                if existing.is_completed() {
                    debug!(generation_id, "edit after completion rejected");
                    return Err(PipelineError::session_closed(generation_id));
                }
                existing
            }
            None => EditTrackingData {
                generation_id: generation_id.to_string(),
                edits: vec![],
                edit_count: 0,
                time_to_first_edit_ms: elapsed_ms,
                total_edit_time_ms: elapsed_ms,
                final_outcome: None,
                created_at: now,
                completed_at: None,
            },
        };

        data.edits.push(edit);
        data.edit_count = data.edits.len() as u64;
        data.total_edit_time_ms = elapsed_ms;
        self.edit_store.put(&data).await?;

        debug!(
            generation_id,
            edit_count = data.edit_count,
            "edit recorded"
        );
        Ok(data)
    }

    /// Complete the editing session and freeze its outcome.
    pub async fn complete_session(
        &self,
        generation_id: &str,
        outcome: FinalOutcome,
    ) -> Result<EditTrackingData> {
        let lock = self.session_lock(generation_id).await;
        let _guard = lock.lock().await;

        let Some(generation) = self.generation_store.get(generation_id).await? else {
            return Err(PipelineError::generation_not_found(generation_id));
        };

        let now = self.clock.now();
        let mut data = match self.edit_store.get(generation_id).await? {
            Some(existing) => {
                if existing.is_completed() {
                    return Err(PipelineError::AlreadyCompleted {
                        id: generation_id.to_string(),
                    });
                }
                existing
            }
            // A session can complete without a single edit when the user
            // kept the generation untouched.
            None => EditTrackingData {
                generation_id: generation_id.to_string(),
                edits: vec![],
                edit_count: 0,
                time_to_first_edit_ms: 0,
                total_edit_time_ms: 0,
                final_outcome: None,
                created_at: generation.created_at,
                completed_at: None,
            },
        };

        data.final_outcome = Some(outcome);
        data.completed_at = Some(now);
        self.edit_store.put(&data).await?;

        info!(generation_id, %outcome, "edit session completed");
        Ok(data)
    }

    pub async fn edits_for_generation(
        &self,
        generation_id: &str,
    ) -> Result<Option<EditTrackingData>> {
        self.edit_store.get(generation_id).await
    }

    /// Most-recent-first window over edit sessions.
    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<EditTrackingData>> {
        self.edit_store.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::store::memory::MemoryStore;
    use crate::storage::GenerationStore;
    use chrono::{TimeZone, Utc};
    use qgate_types::{EditType, GateDecision, GateResult, GenerationTrackingData};

    fn edit(field: &str) -> Edit {
        Edit {
            edit_type: EditType::Modify,
            element_type: "slider".to_string(),
            instance_id: "el-1".to_string(),
            field: Some(field.to_string()),
            old_value: Some(serde_json::json!(0)),
            new_value: Some(serde_json::json!(50)),
        }
    }

    async fn tracked_setup() -> (EditTracker, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        ));
        let generation = GenerationTrackingData {
            generation_id: "gen-1".to_string(),
            prompt_text: "p".to_string(),
            pipeline_version: "1.0.0".to_string(),
            created_at: clock.now(),
            gate_result: GateResult {
                decision: GateDecision::Accept,
                score: 100.0,
                applied_fixes: vec![],
                remaining_issues: vec![],
            },
            duration_ms: 10,
            failure: None,
        };
        store.put_if_absent(&generation).await.unwrap();
        let tracker = EditTracker::new(store.clone(), store, clock.clone());
        (tracker, clock)
    }

    #[tokio::test]
    async fn first_edit_starts_the_session() {
        let (tracker, clock) = tracked_setup().await;
        clock.advance_ms(5_000);
        let data = tracker.record_edit("gen-1", edit("min")).await.unwrap();
        assert_eq!(data.edit_count, 1);
        assert_eq!(data.time_to_first_edit_ms, 5_000);
        assert_eq!(data.total_edit_time_ms, 5_000);
        assert!(data.final_outcome.is_none());
    }

    #[tokio::test]
    async fn edits_keep_call_order_and_refresh_total_time() {
        let (tracker, clock) = tracked_setup().await;
        clock.advance_ms(1_000);
        tracker.record_edit("gen-1", edit("min")).await.unwrap();
        clock.advance_ms(2_000);
        tracker.record_edit("gen-1", edit("max")).await.unwrap();
        clock.advance_ms(3_000);
        let data = tracker.record_edit("gen-1", edit("step")).await.unwrap();

        let fields: Vec<_> = data
            .edits
            .iter()
            .map(|e| e.field.as_deref().unwrap())
            .collect();
        assert_eq!(fields, vec!["min", "max", "step"]);
        assert_eq!(data.time_to_first_edit_ms, 1_000);
        assert_eq!(data.total_edit_time_ms, 6_000);
    }

    #[tokio::test]
    async fn edit_after_completion_is_rejected_and_record_unchanged() {
        let (tracker, clock) = tracked_setup().await;
        clock.advance_ms(1_000);
        tracker.record_edit("gen-1", edit("min")).await.unwrap();
        let frozen = tracker
            .complete_session("gen-1", FinalOutcome::Edited)
            .await
            .unwrap();

        clock.advance_ms(1_000);
        let late = tracker.record_edit("gen-1", edit("max")).await;
        assert!(matches!(
            late,
            Err(PipelineError::SessionClosed { ref id }) if id == "gen-1"
        ));

        let stored = tracker
            .edits_for_generation("gen-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, frozen);
        assert_eq!(stored.edit_count, 1);
    }

    #[tokio::test]
    async fn completing_twice_errors() {
        let (tracker, _clock) = tracked_setup().await;
        tracker
            .complete_session("gen-1", FinalOutcome::Kept)
            .await
            .unwrap();
        let again = tracker
            .complete_session("gen-1", FinalOutcome::Discarded)
            .await;
        assert!(matches!(again, Err(PipelineError::AlreadyCompleted { .. })));

        // The first outcome is frozen.
        let stored = tracker
            .edits_for_generation("gen-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.final_outcome, Some(FinalOutcome::Kept));
    }

    #[tokio::test]
    async fn edits_for_unknown_generation_error() {
        let (tracker, _clock) = tracked_setup().await;
        let result = tracker.record_edit("gen-ghost", edit("min")).await;
        assert!(matches!(
            result,
            Err(PipelineError::GenerationNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn recent_sessions_are_most_recent_first() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        ));
        for i in 0..3 {
            let generation = GenerationTrackingData {
                generation_id: format!("gen-{i}"),
                prompt_text: "p".to_string(),
                pipeline_version: "1.0.0".to_string(),
                created_at: clock.now(),
                gate_result: GateResult {
                    decision: GateDecision::Accept,
                    score: 100.0,
                    applied_fixes: vec![],
                    remaining_issues: vec![],
                },
                duration_ms: 10,
                failure: None,
            };
            store.put_if_absent(&generation).await.unwrap();
        }
        let tracker = EditTracker::new(store.clone(), store, clock);
        for i in 0..3 {
            tracker
                .record_edit(&format!("gen-{i}"), edit("min"))
                .await
                .unwrap();
        }
        let recent = tracker.recent_sessions(2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.generation_id.as_str()).collect();
        assert_eq!(ids, vec!["gen-2", "gen-1"]);
    }
}
