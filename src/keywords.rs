//! Portable connection keywords, DSN parsing, and per-backend key translation.

use std::collections::BTreeMap;

use crate::error::DbApiError;
use crate::types::BackendKind;

/// Connection keywords keyed by their portable names (`host`, `user`, `passwd`, `db`, `port`).
pub type Keywords = BTreeMap<String, String>;

/// Connection parameters keyed by a backend's native names.
pub type NativeParams = BTreeMap<String, String>;

/// Mapping from portable keyword to the name a backend expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    backend: &'static str,
    entries: BTreeMap<&'static str, &'static str>,
}

impl KeyMap {
    #[must_use]
    pub fn new(backend: &'static str, entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            backend,
            entries: entries.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn mysql() -> Self {
        Self::new(
            "mysql",
            &[
                ("host", "Server"),
                ("port", "Port"),
                ("user", "Uid"),
                ("passwd", "Pwd"),
                ("password", "Pwd"),
                ("db", "Database"),
                ("dbname", "Database"),
                ("database", "Database"),
            ],
        )
    }

    #[must_use]
    pub fn postgres() -> Self {
        Self::new(
            "postgres",
            &[
                ("host", "host"),
                ("port", "port"),
                ("user", "user"),
                ("passwd", "password"),
                ("password", "password"),
                ("db", "dbname"),
                ("dbname", "dbname"),
                ("database", "dbname"),
            ],
        )
    }

    /// `SQLite` only understands the database path.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(
            "sqlite",
            &[
                ("db", "Data Source"),
                ("dbname", "Data Source"),
                ("database", "Data Source"),
            ],
        )
    }

    #[must_use]
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Mysql => Self::mysql(),
            BackendKind::Postgres => Self::postgres(),
            BackendKind::Sqlite => Self::sqlite(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    #[must_use]
    pub fn native_key(&self, portable: &str) -> Option<&'static str> {
        self.entries.get(portable).copied()
    }
}

/// Rename every portable keyword to the backend's native key, keeping values unchanged.
///
/// # Errors
///
/// Returns `DbApiError::KeyMapping` for the first keyword the keymap does not know, or
/// `DbApiError::KeyConflict` when two aliases (say `passwd` and `password`) name the same
/// native key. No partial mapping is ever returned.
pub fn translate_keywords(
    keywords: &Keywords,
    keymap: &KeyMap,
) -> Result<NativeParams, DbApiError> {
    let mut native = NativeParams::new();
    // Portable key that produced each native key, for conflict reports.
    let mut sources: BTreeMap<&'static str, &str> = BTreeMap::new();
    for (key, value) in keywords {
        let native_key = keymap.native_key(key).ok_or_else(|| DbApiError::KeyMapping {
            key: key.clone(),
            backend: keymap.backend().to_string(),
        })?;
        if let Some(first) = sources.insert(native_key, key.as_str()) {
            return Err(DbApiError::KeyConflict {
                first: first.to_string(),
                second: key.clone(),
                native_key: native_key.to_string(),
                backend: keymap.backend().to_string(),
            });
        }
        native.insert(native_key.to_string(), value.clone());
    }
    Ok(native)
}

/// Parse a `key=value key=value` DSN into portable keywords.
///
/// Keys are not checked against any keymap; that happens in [`translate_keywords`].
///
/// # Errors
///
/// Returns `DbApiError::MalformedDsn` for a token without exactly one `=` or with an empty key.
pub fn parse_dsn(dsn: &str) -> Result<Keywords, DbApiError> {
    let mut keywords = Keywords::new();
    for token in dsn.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.contains('=') => {
                keywords.insert(key.to_string(), value.to_string());
            }
            _ => return Err(DbApiError::MalformedDsn(token.to_string())),
        }
    }
    Ok(keywords)
}
