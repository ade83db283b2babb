// SQLite adapter - rusqlite behind the generic connection/cursor layer
//
// - config: native parameters to connection settings
// - params: binding native values as rusqlite values
// - query: reading rows and column metadata
// - executor: the NativeLink implementation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::SqliteOptions;
pub use executor::{SqliteConnector, SqliteLink};

use crate::connection::Connection;
use crate::error::DbApiError;
use crate::keywords::{KeyMap, Keywords, parse_dsn, translate_keywords};

pub const DRIVER_ID: &str = "rusqlite";
pub const NATIVE_TYPE_NAME: &str = "rusqlite::Connection";
/// Positional `?` markers.
pub const PARAMSTYLE: &str = "qmark";

#[must_use]
pub fn keymap() -> KeyMap {
    KeyMap::sqlite()
}

/// Connect with portable keywords. Without `db` the database is in memory.
///
/// # Errors
///
/// Returns `DbApiError::KeyMapping` for keywords `SQLite` does not understand, or the
/// errors of [`crate::connect`].
pub fn connect(keywords: &Keywords) -> Result<Connection, DbApiError> {
    let native = translate_keywords(keywords, &keymap())?;
    crate::connect(DRIVER_ID, NATIVE_TYPE_NAME, &native)
}

/// Connect with a `key=value` DSN such as `"db=/tmp/app.db"`.
///
/// # Errors
///
/// Returns `DbApiError::MalformedDsn` for an unparsable DSN, otherwise as [`connect`].
pub fn connect_dsn(dsn: &str) -> Result<Connection, DbApiError> {
    connect(&parse_dsn(dsn)?)
}
