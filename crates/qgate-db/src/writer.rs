//! Write path: schema initialization, append-only generation inserts with
//! duplicate prevention, and edit-session upserts.

use crate::{
    config::DatabaseConfig,
    error::{DatabaseError, Result},
};
use qgate_types::{EditTrackingData, GenerationTrackingData};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use turso::{Builder, Connection};

/// Database writer for atomic keyed inserts.
pub struct DatabaseWriter {
    pub conn: Connection,
    pub config: DatabaseConfig,
}

impl DatabaseWriter {
    /// Open (creating if needed) the database and initialize the schema.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        config.validate()?;
        info!("[DB] Opening database: {}", config.path);

        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    DatabaseError::filesystem(parent.to_string_lossy().to_string(), e)
                })?;
            }
        }

        let db = Builder::new_local(&config.path).build().await.map_err(|e| {
            DatabaseError::connection_with_source(
                format!("failed to create local database: {}", config.path),
                e,
            )
        })?;
        let conn = db.connect().map_err(|e| {
            DatabaseError::connection_with_source("failed to establish database connection", e)
        })?;

        let writer = Self { conn, config };
        writer.initialize_schema().await?;
        Ok(writer)
    }

    async fn initialize_schema(&self) -> Result<()> {
        debug!("[DB] Initializing schema");

        let tables = [
            "CREATE TABLE IF NOT EXISTS generations (
                generation_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                decision TEXT NOT NULL,
                score REAL NOT NULL,
                data TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS edit_sessions (
                generation_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                completed_at TEXT,
                edit_count INTEGER NOT NULL,
                data TEXT NOT NULL
            )",
        ];
        for table in tables.iter() {
            self.conn
                .execute(table, ())
                .await
                .map_err(|e| DatabaseError::query("failed to create table", e))?;
        }

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_generations_created_at ON generations(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_edit_sessions_created_at ON edit_sessions(created_at)",
        ];
        for index in indexes.iter() {
            self.conn
                .execute(index, ())
                .await
                .map_err(|e| DatabaseError::query("failed to create index", e))?;
        }

        Ok(())
    }

    /// Insert a generation record unless its id is already taken.
    ///
    /// Returns `Ok(true)` when the record was created, `Ok(false)` when an
    /// earlier record holds the id. `INSERT OR IGNORE` against the primary
    /// key makes the check-and-insert atomic, so first-writer-wins holds
    /// under concurrent calls.
    pub async fn insert_generation(&self, record: &GenerationTrackingData) -> Result<bool> {
        let data = serde_json::to_string(record).map_err(|e| {
            DatabaseError::serialization("failed to serialize generation record", e)
        })?;

        let rows_affected = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO generations
                     (generation_id, created_at, decision, score, data)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    record.generation_id.clone(),
                    record.created_at.to_rfc3339(),
                    record.gate_result.decision.to_string(),
                    record.gate_result.score,
                    data,
                ),
            )
            .await
            .map_err(|e| DatabaseError::query("failed to insert generation", e))?;

        if rows_affected == 0 {
            debug!(
                "[DB] Generation '{}' already recorded, insert ignored",
                record.generation_id
            );
            return Ok(false);
        }
        info!("[DB] Recorded generation '{}'", record.generation_id);
        Ok(true)
    }

    /// Create or replace the edit-session record for its generation id.
    pub async fn upsert_edit_session(&self, record: &EditTrackingData) -> Result<()> {
        let data = serde_json::to_string(record).map_err(|e| {
            DatabaseError::serialization("failed to serialize edit session", e)
        })?;

        self.conn
            .execute(
                "INSERT INTO edit_sessions
                     (generation_id, created_at, completed_at, edit_count, data)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(generation_id) DO UPDATE SET
                     completed_at = excluded.completed_at,
                     edit_count = excluded.edit_count,
                     data = excluded.data",
                (
                    record.generation_id.clone(),
                    record.created_at.to_rfc3339(),
                    record.completed_at.map(|t| t.to_rfc3339()),
                    record.edit_count as i64,
                    data,
                ),
            )
            .await
            .map_err(|e| DatabaseError::query("failed to upsert edit session", e))?;

        debug!("[DB] Upserted edit session '{}'", record.generation_id);
        Ok(())
    }
}
