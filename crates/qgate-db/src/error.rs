//! Database error handling for qgate-db.

use thiserror::Error;

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Configuration-related errors
    #[error("database configuration error: {message}")]
    Configuration { message: String },

    /// Connection-related errors
    #[error("database connection failed: {message}")]
    ConnectionError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution errors
    #[error("query execution failed: {query}")]
    QueryError {
        query: String,
        #[source]
        source: turso::Error,
    },

    /// A keyed insert found an existing record
    #[error("duplicate record detected: '{id}'")]
    DuplicateDetected { id: String },

    /// Record not found
    #[error("record not found: '{id}' in table {table}")]
    RecordNotFound { id: String, table: String },

    /// Serialization/deserialization errors
    #[error("serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem I/O errors
    #[error("filesystem error: {path}")]
    FilesystemError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic database errors
    #[error("database error: {message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DatabaseError {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn connection_with_source<
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::ConnectionError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn query<S: Into<String>>(query: S, source: turso::Error) -> Self {
        Self::QueryError {
            query: query.into(),
            source,
        }
    }

    pub fn duplicate_detected<S: Into<String>>(id: S) -> Self {
        Self::DuplicateDetected { id: id.into() }
    }

    pub fn record_not_found<I: Into<String>, T: Into<String>>(id: I, table: T) -> Self {
        Self::RecordNotFound {
            id: id.into(),
            table: table.into(),
        }
    }

    pub fn serialization<S: Into<String>>(message: S, source: serde_json::Error) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    pub fn filesystem<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FilesystemError {
            path: path.into(),
            source,
        }
    }

    pub fn generic_with_source<
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Generic {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<turso::Error> for DatabaseError {
    fn from(err: turso::Error) -> Self {
        Self::Generic {
            message: "turso database error".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: "JSON serialization failed".to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(err: std::io::Error) -> Self {
        Self::FilesystemError {
            path: "unknown".to_string(),
            source: err,
        }
    }
}
