//! Round-trip tests for the turso-backed store.

use chrono::{Duration, TimeZone, Utc};
use qgate_db::{DatabaseConfig, TursoStore};
use qgate_lib::storage::{EditStore, GenerationStore};
use qgate_types::{
    Edit, EditTrackingData, EditType, GateDecision, GateResult, GenerationTrackingData,
};
use tempfile::TempDir;

fn generation(id: &str, minute: u32) -> GenerationTrackingData {
    GenerationTrackingData {
        generation_id: id.to_string(),
        prompt_text: "build a tool".to_string(),
        pipeline_version: "1.0.0".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
        gate_result: GateResult {
            decision: GateDecision::Accept,
            score: 92.5,
            applied_fixes: vec![],
            remaining_issues: vec![],
        },
        duration_ms: 420,
        failure: None,
    }
}

async fn open_store(dir: &TempDir) -> TursoStore {
    let path = dir.path().join("tracking.db");
    TursoStore::open(DatabaseConfig::new(path.to_string_lossy().to_string()))
        .await
        .expect("store should open")
}

#[tokio::test]
async fn generation_round_trip_preserves_record() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let record = generation("gen-1", 0);
    assert!(store.put_if_absent(&record).await.unwrap());

    let loaded = GenerationStore::get(&store, "gen-1").await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert!(GenerationStore::get(&store, "gen-2").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_insert_is_ignored_and_first_record_kept() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let first = generation("gen-1", 0);
    let mut second = generation("gen-1", 1);
    second.prompt_text = "a different prompt".to_string();

    assert!(store.put_if_absent(&first).await.unwrap());
    assert!(!store.put_if_absent(&second).await.unwrap());

    let loaded = GenerationStore::get(&store, "gen-1").await.unwrap().unwrap();
    assert_eq!(loaded.prompt_text, "build a tool");
}

#[tokio::test]
async fn recent_generations_are_most_recent_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    for (i, id) in ["gen-a", "gen-b", "gen-c"].iter().enumerate() {
        store
            .put_if_absent(&generation(id, i as u32))
            .await
            .unwrap();
    }

    let recent = GenerationStore::recent(&store, 2).await.unwrap();
    let ids: Vec<_> = recent.iter().map(|r| r.generation_id.as_str()).collect();
    assert_eq!(ids, vec!["gen-c", "gen-b"]);
}

#[tokio::test]
async fn edit_session_upsert_replaces_record() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap();
    let mut session = EditTrackingData {
        generation_id: "gen-1".to_string(),
        edits: vec![Edit {
            edit_type: EditType::Modify,
            element_type: "slider".to_string(),
            instance_id: "el-1".to_string(),
            field: Some("max".to_string()),
            old_value: Some(serde_json::json!(100)),
            new_value: Some(serde_json::json!(200)),
        }],
        edit_count: 1,
        time_to_first_edit_ms: 5_000,
        total_edit_time_ms: 5_000,
        final_outcome: None,
        created_at,
        completed_at: None,
    };
    store.put(&session).await.unwrap();

    session.edits.push(Edit {
        edit_type: EditType::Remove,
        element_type: "chart".to_string(),
        instance_id: "el-2".to_string(),
        field: None,
        old_value: None,
        new_value: None,
    });
    session.edit_count = 2;
    session.total_edit_time_ms = 9_000;
    session.completed_at = Some(created_at + Duration::seconds(30));
    store.put(&session).await.unwrap();

    let loaded = EditStore::get(&store, "gen-1").await.unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.edit_count, 2);

    let recent = EditStore::recent(&store, 10).await.unwrap();
    assert_eq!(recent.len(), 1);
}
