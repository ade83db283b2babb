//! The seam between the generic connection/cursor layer and concrete drivers.
//!
//! A [`Connector`] opens a [`NativeLink`]; the link runs statements and hands back a
//! [`ResultStream`] for row-returning ones. Connectors are looked up by
//! `(driver id, native type name)` in a process-wide registry that the built-in adapters
//! join for each enabled feature.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use crate::error::{BackendError, DbApiError};
use crate::keywords::NativeParams;
use crate::types::NativeValue;

/// Column metadata as reported by a driver's schema facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeColumn {
    pub name: String,
    pub type_name: String,
}

impl NativeColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A statement ready to run: SQL text, bound positional parameters, and the id of the
/// transaction it was built against.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeStatement {
    sql: String,
    params: Vec<NativeValue>,
    transaction_id: u64,
}

impl NativeStatement {
    #[must_use]
    pub fn new(sql: &str, transaction_id: u64) -> Self {
        Self {
            sql: sql.to_string(),
            params: Vec::new(),
            transaction_id,
        }
    }

    pub fn bind(&mut self, value: NativeValue) {
        self.params.push(value);
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[NativeValue] {
        &self.params
    }

    #[must_use]
    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }
}

/// Rows of one executed query, produced on demand until exhausted.
pub trait ResultStream: Send {
    /// Columns of the result, in result order.
    fn columns(&self) -> &[NativeColumn];

    /// Next row, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the row cannot be read.
    fn next_row(&mut self) -> Result<Option<Vec<NativeValue>>, BackendError>;

    /// Release the driver-side resources held by the stream.
    fn close(&mut self);
}

/// One physical link to a backend.
///
/// Links never manage transactions on their own; the owning connection calls
/// `begin`/`commit`/`rollback` explicitly.
pub trait NativeLink: Send {
    /// # Errors
    /// Returns the driver's error if the transaction cannot be started.
    fn begin(&mut self) -> Result<(), BackendError>;

    /// # Errors
    /// Returns the driver's error if the commit fails.
    fn commit(&mut self) -> Result<(), BackendError>;

    /// # Errors
    /// Returns the driver's error if the rollback fails.
    fn rollback(&mut self) -> Result<(), BackendError>;

    /// Run a row-returning statement.
    ///
    /// # Errors
    /// Returns the driver's error if preparation or execution fails.
    fn query(&mut self, statement: &NativeStatement) -> Result<Box<dyn ResultStream>, BackendError>;

    /// Run a statement to completion, returning the affected-row count when the driver
    /// reports one.
    ///
    /// # Errors
    /// Returns the driver's error if preparation or execution fails.
    fn execute(&mut self, statement: &NativeStatement) -> Result<Option<u64>, BackendError>;

    /// # Errors
    /// Returns the driver's error if the link cannot be shut down cleanly.
    fn close(&mut self) -> Result<(), BackendError>;
}

/// Factory for physical links to one kind of backend.
pub trait Connector: Send + Sync {
    /// Open a link using backend-native connection parameters.
    ///
    /// # Errors
    /// Returns the driver's error if the link cannot be established.
    fn open(&self, params: &NativeParams) -> Result<Box<dyn NativeLink>, BackendError>;
}

type RegistryKey = (String, String);

/// Connectors known to the process, keyed by `(driver id, native type name)`.
pub struct BackendRegistry {
    connectors: RwLock<HashMap<RegistryKey, Arc<dyn Connector>>>,
}

impl BackendRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            connectors: RwLock::new(HashMap::new()),
        }
    }

    /// A registry holding the adapters compiled into this build.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        #[cfg(feature = "sqlite")]
        registry.register(
            crate::sqlite::DRIVER_ID,
            crate::sqlite::NATIVE_TYPE_NAME,
            Arc::new(crate::sqlite::SqliteConnector),
        );
        #[cfg(feature = "postgres")]
        registry.register(
            crate::postgres::DRIVER_ID,
            crate::postgres::NATIVE_TYPE_NAME,
            Arc::new(crate::postgres::PostgresConnector),
        );
        #[cfg(feature = "mysql")]
        registry.register(
            crate::mysql::DRIVER_ID,
            crate::mysql::NATIVE_TYPE_NAME,
            Arc::new(crate::mysql::MysqlConnector),
        );
        registry
    }

    /// Add or replace the connector for a `(driver id, native type name)` pair.
    pub fn register(&self, driver_id: &str, type_name: &str, connector: Arc<dyn Connector>) {
        let mut connectors = match self.connectors.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        connectors.insert((driver_id.to_string(), type_name.to_string()), connector);
    }

    /// Look up the connector for a backend.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::BackendUnavailable` if nothing is registered under the pair.
    pub fn resolve(
        &self,
        driver_id: &str,
        type_name: &str,
    ) -> Result<Arc<dyn Connector>, DbApiError> {
        let connectors = match self.connectors.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        connectors
            .get(&(driver_id.to_string(), type_name.to_string()))
            .cloned()
            .ok_or_else(|| DbApiError::BackendUnavailable {
                driver_id: driver_id.to_string(),
                type_name: type_name.to_string(),
            })
    }
}

static REGISTRY: LazyLock<BackendRegistry> = LazyLock::new(BackendRegistry::with_builtins);

/// Make a connector available to [`crate::connect`] under the given identifiers.
pub fn register_backend(driver_id: &str, type_name: &str, connector: Arc<dyn Connector>) {
    tracing::debug!(driver_id, type_name, "registering backend connector");
    REGISTRY.register(driver_id, type_name, connector);
}

/// Find the connector registered for a backend.
///
/// # Errors
///
/// Returns `DbApiError::BackendUnavailable` if the backend was not compiled in or registered.
pub fn resolve_backend(driver_id: &str, type_name: &str) -> Result<Arc<dyn Connector>, DbApiError> {
    REGISTRY.resolve(driver_id, type_name)
}

/// A [`ResultStream`] over rows a driver has already read off the wire.
#[derive(Debug, Default)]
pub struct BufferedStream {
    columns: Vec<NativeColumn>,
    rows: std::collections::VecDeque<Vec<NativeValue>>,
}

impl BufferedStream {
    #[must_use]
    pub fn new(columns: Vec<NativeColumn>, rows: Vec<Vec<NativeValue>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }
}

impl ResultStream for BufferedStream {
    fn columns(&self) -> &[NativeColumn] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<NativeValue>>, BackendError> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopConnector;

    impl Connector for NoopConnector {
        fn open(&self, _params: &NativeParams) -> Result<Box<dyn NativeLink>, BackendError> {
            Err(BackendError::Other("noop".into()))
        }
    }

    #[test]
    fn unknown_backend_is_unavailable() {
        let registry = BackendRegistry::empty();
        let err = registry.resolve("missing", "missing::Conn").err().unwrap();
        assert!(matches!(err, DbApiError::BackendUnavailable { .. }));
    }

    #[test]
    fn registered_backend_resolves_by_both_identifiers() {
        let registry = BackendRegistry::empty();
        registry.register("noop", "noop::Conn", Arc::new(NoopConnector));
        assert!(registry.resolve("noop", "noop::Conn").is_ok());
        assert!(registry.resolve("noop", "other::Conn").is_err());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn builtins_include_sqlite() {
        assert!(resolve_backend("rusqlite", "rusqlite::Connection").is_ok());
    }

    #[test]
    fn buffered_stream_drains_in_order() {
        let mut stream = BufferedStream::new(
            vec![NativeColumn::new("a", "INTEGER")],
            vec![vec![NativeValue::Int(1)], vec![NativeValue::Int(2)]],
        );
        assert_eq!(stream.next_row().unwrap(), Some(vec![NativeValue::Int(1)]));
        assert_eq!(stream.next_row().unwrap(), Some(vec![NativeValue::Int(2)]));
        assert_eq!(stream.next_row().unwrap(), None);
    }
}
