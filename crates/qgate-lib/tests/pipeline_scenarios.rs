//! End-to-end scenarios for the generation pipeline: generate, validate,
//! gate, track, then aggregate the user edits that follow acceptance.

use qgate_lib::clock::test_support::ManualClock;
use qgate_lib::{
    aggregate, EditTracker, FixRegistry, GenerationPipeline, MemoryStore, MockGenerator,
    PipelineError,
};
use qgate_lib::pipeline::PipelineConfig;
use qgate_types::{
    Edit, EditType, ElementRegistry, FailureType, FinalOutcome, GateDecision,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
    ))
}

fn pipeline_on(store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> GenerationPipeline {
    GenerationPipeline::new(
        Arc::new(MockGenerator::new()),
        ElementRegistry::standard(),
        FixRegistry::standard(),
        store,
        clock,
        PipelineConfig {
            generator_timeout: Duration::from_secs(5),
            ..PipelineConfig::default()
        },
    )
}

fn modify_edit(field: &str) -> Edit {
    Edit {
        edit_type: EditType::Modify,
        element_type: "slider".into(),
        instance_id: "el-slider".into(),
        field: Some(field.into()),
        old_value: None,
        new_value: Some(serde_json::json!(10)),
    }
}

#[tokio::test]
async fn accepted_generation_flows_into_edit_tracking() {
    let store = Arc::new(MemoryStore::new());
    let clock = manual_clock();
    let pipeline = pipeline_on(store.clone(), clock.clone());

    let outcome = pipeline
        .process("gen-1", "build an interest calculator")
        .await
        .unwrap();
    assert_eq!(outcome.decision, GateDecision::Accept);
    assert_eq!(outcome.summary, "Your tool is ready to use.");

    let edits = EditTracker::new(store.clone(), store.clone(), clock.clone());
    clock.advance_ms(30_000);
    edits.record_edit("gen-1", modify_edit("max")).await.unwrap();
    clock.advance_ms(15_000);
    edits.record_edit("gen-1", modify_edit("min")).await.unwrap();

    let session = edits
        .complete_session("gen-1", FinalOutcome::Edited)
        .await
        .unwrap();
    assert_eq!(session.edit_count, 2);
    assert_eq!(session.time_to_first_edit_ms, 30_000);
    assert_eq!(session.total_edit_time_ms, 45_000);

    // Completion wins over the late edit; the frozen record is unchanged.
    let late = edits.record_edit("gen-1", modify_edit("step")).await;
    assert!(matches!(late, Err(PipelineError::SessionClosed { .. })));
    let stored = edits.edits_for_generation("gen-1").await.unwrap().unwrap();
    assert_eq!(stored.edit_count, 2);
}

#[tokio::test]
async fn flawed_generation_is_auto_fixed() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_on(store, manual_clock());

    let outcome = pipeline
        .process("gen-1", "a plotter with a broken wire")
        .await
        .unwrap();
    assert_eq!(outcome.decision, GateDecision::AutoFix);
    assert_eq!(outcome.gate_result.applied_fixes.len(), 1);
    assert!(outcome.gate_result.remaining_issues.is_empty());

    // The delivered composition no longer carries the bad wire.
    let delivered = outcome.composition.unwrap();
    assert!(delivered
        .connections
        .iter()
        .all(|c| c.target_element_id != "el-ghost"));
}

#[tokio::test]
async fn duplicate_generation_id_errors_and_keeps_first_record() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_on(store, manual_clock());

    let first = pipeline
        .process("gen-1", "build a unit converter")
        .await
        .unwrap();
    assert_eq!(first.decision, GateDecision::Accept);

    let second = pipeline.process("gen-1", "something else entirely").await;
    assert!(matches!(
        second,
        Err(PipelineError::DuplicateGeneration { ref id }) if id == "gen-1"
    ));

    let stored = pipeline.tracker().get("gen-1").await.unwrap().unwrap();
    assert_eq!(stored.prompt_text, "build a unit converter");
}

#[tokio::test]
async fn failure_stats_fold_over_mixed_history() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_on(store.clone(), manual_clock());

    pipeline
        .process("gen-1", "build a tip calculator")
        .await
        .unwrap();
    pipeline
        .process("gen-2", "a dashboard from an unavailable model")
        .await
        .unwrap();
    pipeline
        .process("gen-3", "a tool with a tangled loop inside")
        .await
        .unwrap();

    let records = pipeline.tracker().get("gen-1").await.unwrap().unwrap();
    assert!(records.failure.is_none());

    let history: Vec<_> = {
        use qgate_lib::GenerationStore;
        store.recent(10).await.unwrap()
    };
    let stats = aggregate(&history);
    assert_eq!(stats.count(FailureType::GenerationError), 1);
    assert_eq!(stats.count(FailureType::Cycle), 1);

    let rate = pipeline.tracker().acceptance_rate(10).await.unwrap();
    assert!((rate - 1.0 / 3.0).abs() < 1e-9);
}
