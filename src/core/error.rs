//! Error types for the wrapper
//!
//! This module defines all error types that can occur while connecting,
//! executing statements and materializing rows.

/// Result type alias for wrapper operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Error types for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Misuse of the wrapper: empty SQL, missing connection parameters, bad charset
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection failed with details
    #[error("Connection failed to {host}:{port} - {message}")]
    ConnectionFailed {
        host: String,
        port: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The connection was closed or never opened
    #[error("Not connected to database")]
    NotConnected,

    /// Driver rejected the statement; `sql` is only filled in debug mode
    #[error(
        "[ERR] {message}{}",
        .sql.as_deref().map(|s| format!("\n[SQL] {s}")).unwrap_or_default()
    )]
    QueryError {
        message: String,
        sql: Option<String>,
    },

    /// Query timeout
    #[error("Query timeout after {timeout_ms}ms")]
    QueryTimeout { timeout_ms: u64 },

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Row could not be turned into the requested record type
    #[error("Row deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// MySQL error
    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MysqlError(#[from] mysql_async::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DatabaseError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Configuration(msg.into())
    }

    /// Create a connection failed error with host/port details
    pub fn connection_failed(
        host: impl Into<String>,
        port: u16,
        message: impl Into<String>,
    ) -> Self {
        DatabaseError::ConnectionFailed {
            host: host.into(),
            port,
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source error
    pub fn connection_failed_with_source(
        host: impl Into<String>,
        port: u16,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        DatabaseError::ConnectionFailed {
            host: host.into(),
            port,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a query error carrying the driver's message
    pub fn query<S: Into<String>>(msg: S) -> Self {
        DatabaseError::QueryError {
            message: msg.into(),
            sql: None,
        }
    }

    /// Create a query timeout error
    pub fn query_timeout(timeout_ms: u64) -> Self {
        DatabaseError::QueryTimeout { timeout_ms }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Other(msg.into())
    }

    /// Attach the offending SQL text to a query error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_sql(self, sql: impl Into<String>) -> Self {
        match self {
            DatabaseError::QueryError { message, .. } => DatabaseError::QueryError {
                message,
                sql: Some(sql.into()),
            },
            other => other,
        }
    }

    /// Whether this error came from the driver rejecting a statement
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::QueryError { .. } | DatabaseError::QueryTimeout { .. }
        )
    }
}
