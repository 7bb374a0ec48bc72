//! In-memory store, used by tests and the offline benchmark runner.

use crate::error::Result;
use crate::storage::{EditStore, GenerationStore};
use async_trait::async_trait;
use qgate_types::{EditTrackingData, GenerationTrackingData};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Insertion-ordered in-memory store implementing both storage traits.
#[derive(Default)]
pub struct MemoryStore {
    generations: RwLock<Vec<GenerationTrackingData>>,
    generation_index: RwLock<HashMap<String, usize>>,
    edits: RwLock<Vec<EditTrackingData>>,
    edit_index: RwLock<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn put_if_absent(&self, data: &GenerationTrackingData) -> Result<bool> {
        // Both maps under the index lock so concurrent writers for the
        // same id serialize on one atomic check-then-insert.
        let mut index = self.generation_index.write().await;
        if index.contains_key(&data.generation_id) {
            return Ok(false);
        }
        let mut records = self.generations.write().await;
        index.insert(data.generation_id.clone(), records.len());
        records.push(data.clone());
        Ok(true)
    }

    async fn get(&self, generation_id: &str) -> Result<Option<GenerationTrackingData>> {
        let index = self.generation_index.read().await;
        let Some(&position) = index.get(generation_id) else {
            return Ok(None);
        };
        let records = self.generations.read().await;
        Ok(records.get(position).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<GenerationTrackingData>> {
        let records = self.generations.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl EditStore for MemoryStore {
    async fn put(&self, data: &EditTrackingData) -> Result<()> {
        let mut index = self.edit_index.write().await;
        let mut records = self.edits.write().await;
        match index.get(&data.generation_id) {
            Some(&position) => records[position] = data.clone(),
            None => {
                index.insert(data.generation_id.clone(), records.len());
                records.push(data.clone());
            }
        }
        Ok(())
    }

    async fn get(&self, generation_id: &str) -> Result<Option<EditTrackingData>> {
        let index = self.edit_index.read().await;
        let Some(&position) = index.get(generation_id) else {
            return Ok(None);
        };
        let records = self.edits.read().await;
        Ok(records.get(position).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<EditTrackingData>> {
        let records = self.edits.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}
