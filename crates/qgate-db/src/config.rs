use crate::error::{DatabaseError, Result};

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the local database file.
    pub path: String,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Read the path from `QGATE_DB_PATH`, falling back to the default.
    pub fn from_env() -> Self {
        let path =
            std::env::var("QGATE_DB_PATH").unwrap_or_else(|_| "db/qgate_tracking.db".to_string());
        Self { path }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(DatabaseError::configuration("database path is empty"));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "db/qgate_tracking.db".to_string(),
        }
    }
}
