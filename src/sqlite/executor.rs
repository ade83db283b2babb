use crate::backend::{Connector, NativeLink, NativeStatement, ResultStream};
use crate::error::BackendError;
use crate::keywords::NativeParams;

use super::config::SqliteOptions;
use super::params::Params;
use super::query::{build_result_stream, query_scalar_i64};

/// Opens [`SqliteLink`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteConnector;

impl Connector for SqliteConnector {
    fn open(&self, params: &NativeParams) -> Result<Box<dyn NativeLink>, BackendError> {
        let opts = SqliteOptions::from_native(params)?;
        tracing::debug!(db_path = %opts.db_path, "opening sqlite database");
        let conn = rusqlite::Connection::open(&opts.db_path)?;
        Ok(Box::new(SqliteLink { conn: Some(conn) }))
    }
}

/// One open rusqlite connection.
pub struct SqliteLink {
    conn: Option<rusqlite::Connection>,
}

impl SqliteLink {
    fn conn(&self) -> Result<&rusqlite::Connection, BackendError> {
        self.conn
            .as_ref()
            .ok_or_else(|| BackendError::Other("SQLite connection already closed".into()))
    }

    fn total_changes(conn: &rusqlite::Connection) -> Result<i64, BackendError> {
        query_scalar_i64(conn, "SELECT total_changes()")
    }
}

impl NativeLink for SqliteLink {
    fn begin(&mut self) -> Result<(), BackendError> {
        Ok(self.conn()?.execute_batch("BEGIN")?)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        Ok(self.conn()?.execute_batch("COMMIT")?)
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        Ok(self.conn()?.execute_batch("ROLLBACK")?)
    }

    fn query(
        &mut self,
        statement: &NativeStatement,
    ) -> Result<Box<dyn ResultStream>, BackendError> {
        let conn = self.conn()?;
        let params = Params::convert(statement.params());
        let mut stmt = conn.prepare(statement.sql())?;
        let stream = build_result_stream(&mut stmt, params.as_values())?;
        Ok(Box::new(stream))
    }

    fn execute(&mut self, statement: &NativeStatement) -> Result<Option<u64>, BackendError> {
        let conn = self.conn()?;
        let params = Params::convert(statement.params());
        let before = Self::total_changes(conn)?;
        let readonly = {
            let mut stmt = conn.prepare(statement.sql())?;
            let readonly = stmt.readonly();
            // Step to completion; rows of a row-returning non-query are discarded.
            let mut rows = stmt.query(rusqlite::params_from_iter(params.as_values().iter()))?;
            while rows.next()?.is_some() {}
            readonly
        };
        if readonly {
            return Ok(None);
        }
        let after = Self::total_changes(conn)?;
        Ok(Some(u64::try_from(after - before).unwrap_or(0)))
    }

    fn close(&mut self) -> Result<(), BackendError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| err.into()),
            None => Ok(()),
        }
    }
}
