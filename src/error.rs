use thiserror::Error;

/// A failure reported by a backend driver.
///
/// Carried as the source of the [`DbApiError`] variants that wrap driver failures.
#[derive(Debug, Error)]
pub enum BackendError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MysqlError(#[from] mysql_async::Error),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Value conversion error: {0}")]
    Conversion(String),

    #[error("Backend error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DbApiError {
    /// A portable keyword has no native counterpart for the chosen backend.
    #[error("Keyword `{key}` is not supported by backend `{backend}`")]
    KeyMapping { key: String, backend: String },

    /// Two portable keywords translate to the same native key.
    #[error("Keywords `{first}` and `{second}` both map to `{native_key}` for `{backend}`")]
    KeyConflict {
        first: String,
        second: String,
        native_key: String,
        backend: String,
    },

    #[error("Malformed DSN token `{0}`: expected exactly one `=`")]
    MalformedDsn(String),

    #[error("Backend `{driver_id}` / `{type_name}` is not available")]
    BackendUnavailable { driver_id: String, type_name: String },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BackendError>,
    },

    #[error("Error executing `{sql}`: {source}")]
    StatementExecution {
        sql: String,
        #[source]
        source: BackendError,
    },

    #[error("Transaction error: {message}")]
    Transaction {
        message: String,
        #[source]
        source: Option<BackendError>,
    },

    #[error("Cursor state error: {0}")]
    CursorState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbApiError {
    pub(crate) fn connection(message: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DbApiError::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn transaction(message: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DbApiError::Transaction {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn execution(sql: &str, source: impl Into<BackendError>) -> Self {
        DbApiError::StatementExecution {
            sql: sql.to_string(),
            source: source.into(),
        }
    }
}
