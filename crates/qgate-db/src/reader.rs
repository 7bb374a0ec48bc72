//! Read path: lookups by generation id and most-recent-first windows.

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, Result};
use qgate_types::{EditTrackingData, GenerationTrackingData};
use tracing::debug;
use turso::{Builder, Connection};

/// Database reader for read-only operations.
pub struct DatabaseReader {
    conn: Connection,
}

impl DatabaseReader {
    /// Create a new database reader with an existing connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Create a new database reader from configuration, with its own
    /// connection to the same database file.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let db = Builder::new_local(&config.path).build().await.map_err(|e| {
            DatabaseError::connection_with_source(
                format!("failed to open local database: {}", config.path),
                e,
            )
        })?;
        let conn = db.connect().map_err(|e| {
            DatabaseError::connection_with_source("failed to establish database connection", e)
        })?;
        Ok(Self { conn })
    }

    pub async fn get_generation(
        &self,
        generation_id: &str,
    ) -> Result<Option<GenerationTrackingData>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM generations WHERE generation_id = ?",
                [generation_id],
            )
            .await
            .map_err(|e| DatabaseError::query("failed to get generation", e))?;

        match rows.next().await? {
            Some(row) => {
                let data: String = row.get(0).map_err(|e| {
                    DatabaseError::generic_with_source("failed to read generation data", e)
                })?;
                let record = serde_json::from_str(&data).map_err(|e| {
                    DatabaseError::serialization("failed to deserialize generation record", e)
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Most-recent-first window over generation records.
    pub async fn recent_generations(&self, limit: usize) -> Result<Vec<GenerationTrackingData>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM generations
                 ORDER BY created_at DESC, rowid DESC LIMIT ?",
                [limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::query("failed to query recent generations", e))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::query("failed to iterate generations", e))?
        {
            let data: String = row.get(0).map_err(|e| {
                DatabaseError::generic_with_source("failed to read generation data", e)
            })?;
            records.push(serde_json::from_str(&data).map_err(|e| {
                DatabaseError::serialization("failed to deserialize generation record", e)
            })?);
        }
        debug!("[DB] Retrieved {} recent generations", records.len());
        Ok(records)
    }

    pub async fn get_edit_session(
        &self,
        generation_id: &str,
    ) -> Result<Option<EditTrackingData>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM edit_sessions WHERE generation_id = ?",
                [generation_id],
            )
            .await
            .map_err(|e| DatabaseError::query("failed to get edit session", e))?;

        match rows.next().await? {
            Some(row) => {
                let data: String = row.get(0).map_err(|e| {
                    DatabaseError::generic_with_source("failed to read edit session data", e)
                })?;
                let record = serde_json::from_str(&data).map_err(|e| {
                    DatabaseError::serialization("failed to deserialize edit session", e)
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Most-recent-first window over edit sessions.
    pub async fn recent_edit_sessions(&self, limit: usize) -> Result<Vec<EditTrackingData>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM edit_sessions
                 ORDER BY created_at DESC, rowid DESC LIMIT ?",
                [limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::query("failed to query recent edit sessions", e))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::query("failed to iterate edit sessions", e))?
        {
            let data: String = row.get(0).map_err(|e| {
                DatabaseError::generic_with_source("failed to read edit session data", e)
            })?;
            records.push(serde_json::from_str(&data).map_err(|e| {
                DatabaseError::serialization("failed to deserialize edit session", e)
            })?);
        }
        Ok(records)
    }
}
