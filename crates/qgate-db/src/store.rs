//! [`TursoStore`], the durable implementation of the pipeline's storage
//! traits.
//!
//! Generation inserts are first-writer-wins at the database level; edit
//! sessions rely on the tracker's per-id serialization and only persist.

use crate::{config::DatabaseConfig, reader::DatabaseReader, writer::DatabaseWriter};
use async_trait::async_trait;
use qgate_lib::error::{PipelineError, Result};
use qgate_lib::storage::{EditStore, GenerationStore};
use qgate_types::{EditTrackingData, GenerationTrackingData};

/// Durable store over a local turso database.
pub struct TursoStore {
    writer: DatabaseWriter,
    reader: DatabaseReader,
}

impl TursoStore {
    /// Open the database at `config.path`, creating schema on first use.
    pub async fn open(config: DatabaseConfig) -> crate::error::Result<Self> {
        let writer = DatabaseWriter::new(config).await?;
        let reader = DatabaseReader::from_config(&writer.config).await?;
        Ok(Self { writer, reader })
    }
}

fn storage_err(err: crate::error::DatabaseError) -> PipelineError {
    PipelineError::storage_with_source("database operation failed", err)
}

#[async_trait]
impl GenerationStore for TursoStore {
    async fn put_if_absent(&self, data: &GenerationTrackingData) -> Result<bool> {
        self.writer
            .insert_generation(data)
            .await
            .map_err(storage_err)
    }

    async fn get(&self, generation_id: &str) -> Result<Option<GenerationTrackingData>> {
        self.reader
            .get_generation(generation_id)
            .await
            .map_err(storage_err)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<GenerationTrackingData>> {
        self.reader
            .recent_generations(limit)
            .await
            .map_err(storage_err)
    }
}

#[async_trait]
impl EditStore for TursoStore {
    async fn put(&self, data: &EditTrackingData) -> Result<()> {
        self.writer
            .upsert_edit_session(data)
            .await
            .map_err(storage_err)
    }

    async fn get(&self, generation_id: &str) -> Result<Option<EditTrackingData>> {
        self.reader
            .get_edit_session(generation_id)
            .await
            .map_err(storage_err)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<EditTrackingData>> {
        self.reader
            .recent_edit_sessions(limit)
            .await
            .map_err(storage_err)
    }
}
