// MySQL adapter - mysql_async behind the generic connection/cursor layer
//
// - config: native parameters to mysql_async options
// - params: binding native values as mysql values
// - query: reading rows and column metadata
// - executor: the NativeLink implementation

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::MysqlOptions;
pub use executor::{MysqlConnector, MysqlLink};

use crate::connection::Connection;
use crate::error::DbApiError;
use crate::keywords::{KeyMap, Keywords, parse_dsn, translate_keywords};

pub const DRIVER_ID: &str = "mysql_async";
pub const NATIVE_TYPE_NAME: &str = "mysql_async::Conn";
/// Positional `?` markers.
pub const PARAMSTYLE: &str = "qmark";

#[must_use]
pub fn keymap() -> KeyMap {
    KeyMap::mysql()
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

/// Connect with a DSN such as `"host=localhost port=3306 db=app user=admin passwd=secret"`.
///
/// # Errors
///
/// Returns `DbApiError::MalformedDsn` for an unparsable DSN, otherwise as [`connect`].
pub fn connect_dsn(dsn: &str) -> Result<Connection, DbApiError> {
    connect(&parse_dsn(dsn)?)
}
