use serde::Deserialize;

use crate::connection::Connection;
use crate::error::DbApiError;
use crate::keywords::{KeyMap, Keywords, NativeParams, parse_dsn, translate_keywords};
use crate::types::BackendKind;

/// How connection parameters were supplied: a keyword map or a DSN string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConnectionSpec {
    Dsn(String),
    Keywords(Keywords),
}

impl Default for ConnectionSpec {
    fn default() -> Self {
        ConnectionSpec::Keywords(Keywords::new())
    }
}

impl ConnectionSpec {
    /// The portable keywords, parsing the DSN if there is one.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::MalformedDsn` if a DSN cannot be parsed.
    pub fn to_keywords(&self) -> Result<Keywords, DbApiError> {
        match self {
            ConnectionSpec::Dsn(dsn) => parse_dsn(dsn),
            ConnectionSpec::Keywords(keywords) => Ok(keywords.clone()),
        }
    }

    /// Parse (if needed) and translate into backend-native parameters.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::MalformedDsn` or `DbApiError::KeyMapping`.
    pub fn translate(&self, keymap: &KeyMap) -> Result<NativeParams, DbApiError> {
        translate_keywords(&self.to_keywords()?, keymap)
    }
}

/// Everything needed to open a connection: the backend and its parameters.
///
/// Deserializes from JSON such as
/// `{"backend": "sqlite", "params": {"db": "app.db"}}` or
/// `{"backend": "postgres", "params": "host=localhost user=app db=app"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectOptions {
    pub backend: BackendKind,
    #[serde(default)]
    pub params: ConnectionSpec,
}

impl ConnectOptions {
    #[must_use]
    pub fn builder(backend: BackendKind) -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::new(backend)
    }

    /// # Errors
    ///
    /// Returns `DbApiError::Config` if the JSON does not describe connect options.
    pub fn from_json(json: &str) -> Result<Self, DbApiError> {
        serde_json::from_str(json).map_err(|e| DbApiError::Config(e.to_string()))
    }

    /// Translate the parameters for the chosen backend, resolve its connector and open a
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns the translation errors of [`ConnectionSpec::translate`] or the errors of
    /// [`crate::connect`].
    pub fn connect(&self) -> Result<Connection, DbApiError> {
        let native = self.params.translate(&KeyMap::for_backend(self.backend))?;
        let (driver_id, type_name) = self.backend.identifiers();
        tracing::debug!(backend = %self.backend, keys = native.len(), "connecting from options");
        crate::connect(driver_id, type_name, &native)
    }
}

/// Fluent construction of [`ConnectOptions`].
///
/// A DSN set with [`ConnectOptionsBuilder::dsn`] replaces any keywords added before it;
/// keywords added after a DSN are merged over the parsed DSN when the options are built.
#[derive(Debug, Clone)]
pub struct ConnectOptionsBuilder {
    backend: BackendKind,
    dsn: Option<String>,
    keywords: Keywords,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            dsn: None,
            keywords: Keywords::new(),
        }
    }

    #[must_use]
    pub fn keyword(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keywords.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self.keywords.clear();
        self
    }

    /// # Errors
    ///
    /// Returns `DbApiError::MalformedDsn` if the DSN cannot be parsed.
    pub fn finish(self) -> Result<ConnectOptions, DbApiError> {
        let params = match self.dsn {
            Some(dsn) if self.keywords.is_empty() => ConnectionSpec::Dsn(dsn),
            Some(dsn) => {
                let mut merged = parse_dsn(&dsn)?;
                merged.extend(self.keywords);
                ConnectionSpec::Keywords(merged)
            }
            None => ConnectionSpec::Keywords(self.keywords),
        };
        Ok(ConnectOptions {
            backend: self.backend,
            params,
        })
    }

    /// Build the options and connect.
    ///
    /// # Errors
    ///
    /// Same as [`ConnectOptionsBuilder::finish`] and [`ConnectOptions::connect`].
    pub fn connect(self) -> Result<Connection, DbApiError> {
        self.finish()?.connect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_keyword_and_dsn_params_from_json() {
        let opts = ConnectOptions::from_json(r#"{"backend": "mysql", "params": {"host": "db"}}"#)
            .unwrap();
        assert_eq!(opts.backend, BackendKind::Mysql);
        let native = opts.params.translate(&KeyMap::mysql()).unwrap();
        assert_eq!(native["Server"], "db");

        let opts =
            ConnectOptions::from_json(r#"{"backend": "postgres", "params": "host=a port=5433"}"#)
                .unwrap();
        assert_eq!(opts.params, ConnectionSpec::Dsn("host=a port=5433".into()));
        let native = opts.params.translate(&KeyMap::postgres()).unwrap();
        assert_eq!(native["port"], "5433");
    }

    #[test]
    fn missing_params_means_no_keywords() {
        let opts = ConnectOptions::from_json(r#"{"backend": "sqlite"}"#).unwrap();
        assert_eq!(opts.params, ConnectionSpec::default());
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(matches!(
            ConnectOptions::from_json(r#"{"backend": "oracle"}"#),
            Err(DbApiError::Config(_))
        ));
    }

    #[test]
    fn builder_merges_keywords_over_dsn() {
        let opts = ConnectOptions::builder(BackendKind::Postgres)
            .keyword("port", "1")
            .dsn("host=a port=5432")
            .keyword("user", "app")
            .finish()
            .unwrap();
        let keywords = opts.params.to_keywords().unwrap();
        assert_eq!(keywords.len(), 3);
        assert_eq!(keywords["port"], "5432");
        assert_eq!(keywords["user"], "app");
    }

    #[test]
    fn builder_surfaces_malformed_dsn() {
        let result = ConnectOptionsBuilder::new(BackendKind::Sqlite)
            .dsn("db")
            .keyword("db", "x")
            .finish();
        assert!(matches!(result, Err(DbApiError::MalformedDsn(_))));
    }
}
