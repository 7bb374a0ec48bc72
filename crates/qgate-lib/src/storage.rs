//! Storage collaborator traits.
//!
//! The pipeline needs only get / put-if-absent / query-by-recency from its
//! durable store; everything store-specific stays behind these traits. The
//! in-memory implementation lives in [`crate::store::memory`], the
//! turso-backed one in the `qgate-db` crate.

use crate::error::Result;
use async_trait::async_trait;
use qgate_types::{EditTrackingData, GenerationTrackingData};

/// Durable store for generation provenance records.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Atomically create the record unless one exists for its id.
    ///
    /// First writer wins: returns `Ok(true)` when the record was created
    /// and `Ok(false)` when an earlier record holds the id. Must hold under
    /// concurrent calls for the same id.
    async fn put_if_absent(&self, data: &GenerationTrackingData) -> Result<bool>;

    async fn get(&self, generation_id: &str) -> Result<Option<GenerationTrackingData>>;

    /// Most-recent-first window over tracked generations.
    async fn recent(&self, limit: usize) -> Result<Vec<GenerationTrackingData>>;
}

/// Durable store for edit-session records.
#[async_trait]
pub trait EditStore: Send + Sync {
    /// Create or replace the record for its generation id. The edit
    /// tracker serializes calls per id; the store only persists.
    async fn put(&self, data: &EditTrackingData) -> Result<()>;

    async fn get(&self, generation_id: &str) -> Result<Option<EditTrackingData>>;

    /// Most-recent-first window over edit sessions.
    async fn recent(&self, limit: usize) -> Result<Vec<EditTrackingData>>;
}
