//! A blocking connection/cursor access layer with one call surface for `SQLite`,
//! `PostgreSQL` and `MySQL`.
//!
//! Connections are always inside a transaction: work becomes visible only after
//! [`Connection::commit`], and closing rolls back whatever is pending. Portable connection
//! keywords (`host`, `port`, `user`, `passwd`, `db`) are translated per backend, and rows come
//! back as [`RowValues`] with a single NULL marker.

pub mod backend;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod keywords;
pub mod materialize;
pub mod prelude;
pub mod reflect;
pub mod results;
pub mod types;

#[cfg(any(feature = "postgres", feature = "mysql"))]
mod runtime;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::{
    BackendRegistry, BufferedStream, Connector, NativeColumn, NativeLink, NativeStatement,
    ResultStream, register_backend, resolve_backend,
};
pub use config::{ConnectOptions, ConnectOptionsBuilder, ConnectionSpec};
pub use connection::{Connection, Transaction};
pub use cursor::{Cursor, Rows, StatementKind, classify_statement};
pub use error::{BackendError, DbApiError};
pub use keywords::{KeyMap, Keywords, NativeParams, parse_dsn, translate_keywords};
pub use reflect::ColumnDescriptor;
pub use results::Row;
pub use types::{BackendKind, NativeValue, RowValues};

/// Open a connection to the backend registered as `(backend_id, native_type_name)` using
/// already translated, backend-native parameters.
///
/// # Errors
///
/// Returns `DbApiError::BackendUnavailable` if no connector is registered for the pair,
/// `DbApiError::Connection` if the link cannot be opened, or `DbApiError::Transaction` if
/// the first transaction cannot be started.
pub fn connect(
    backend_id: &str,
    native_type_name: &str,
    params: &NativeParams,
) -> Result<Connection, DbApiError> {
    let connector = resolve_backend(backend_id, native_type_name)?;
    Connection::open(backend_id, connector.as_ref(), params)
}
