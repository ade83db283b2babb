// PostgreSQL adapter - tokio-postgres behind the generic connection/cursor layer
//
// - config: native parameters to a tokio_postgres::Config
// - params: binding native values with ToSql
// - query: reading rows and column metadata
// - executor: the NativeLink implementation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::PostgresOptions;
pub use executor::{PostgresConnector, PostgresLink};

use crate::connection::Connection;
use crate::error::DbApiError;
use crate::keywords::{KeyMap, Keywords, parse_dsn, translate_keywords};

pub const DRIVER_ID: &str = "tokio-postgres";
pub const NATIVE_TYPE_NAME: &str = "tokio_postgres::Client";
/// Numbered `$1`, `$2`, ... markers.
pub const PARAMSTYLE: &str = "numeric";

#[must_use]
pub fn keymap() -> KeyMap {
    KeyMap::postgres()
}

/// Connect with portable keywords (`host`, `port`, `user`, `passwd`, `db`).
///
/// # Errors
///
/// Returns `DbApiError::KeyMapping` for unknown keywords, or the errors of [`crate::connect`].
pub fn connect(keywords: &Keywords) -> Result<Connection, DbApiError> {
    let native = translate_keywords(keywords, &keymap())?;
    crate::connect(DRIVER_ID, NATIVE_TYPE_NAME, &native)
}

/// Connect with a DSN such as `"host=localhost port=5432 dbname=app user=admin password=secret"`.
///
/// # Errors
///
/// Returns `DbApiError::MalformedDsn` for an unparsable DSN, otherwise as [`connect`].
pub fn connect_dsn(dsn: &str) -> Result<Connection, DbApiError> {
    connect(&parse_dsn(dsn)?)
}
