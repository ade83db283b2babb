use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};
use tokio::runtime::Runtime;

use crate::backend::{Connector, NativeLink, NativeStatement, ResultStream};
use crate::error::BackendError;
use crate::keywords::NativeParams;
use crate::runtime::current_thread_runtime;

use super::config::MysqlOptions;
use super::params::convert;
use super::query::build_result_stream;

/// Opens [`MysqlLink`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlConnector;

impl Connector for MysqlConnector {
    fn open(&self, params: &NativeParams) -> Result<Box<dyn NativeLink>, BackendError> {
        let opts = MysqlOptions::from_native(params)?;
        let runtime = current_thread_runtime()?;
        tracing::debug!(server = %opts.server, port = opts.port, "connecting to mysql");
        let conn = runtime.block_on(Conn::new(opts.to_opts()))?;
        Ok(Box::new(MysqlLink {
            runtime,
            conn: Some(conn),
        }))
    }
}

/// One mysql_async connection driven by its own runtime.
pub struct MysqlLink {
    runtime: Runtime,
    conn: Option<Conn>,
}

fn open_conn(conn: &mut Option<Conn>) -> Result<&mut Conn, BackendError> {
    conn.as_mut()
        .ok_or_else(|| BackendError::Other("MySQL connection already closed".into()))
}

impl MysqlLink {
    fn query_drop(&mut self, sql: &str) -> Result<(), BackendError> {
        let conn = open_conn(&mut self.conn)?;
        Ok(self.runtime.block_on(conn.query_drop(sql))?)
    }
}

impl NativeLink for MysqlLink {
    fn begin(&mut self) -> Result<(), BackendError> {
        self.query_drop("START TRANSACTION")
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.query_drop("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.query_drop("ROLLBACK")
    }

    fn query(
        &mut self,
        statement: &NativeStatement,
    ) -> Result<Box<dyn ResultStream>, BackendError> {
        let conn = open_conn(&mut self.conn)?;
        let params = convert(statement.params());
        let stream = self.runtime.block_on(async {
            let stmt = conn.prep(statement.sql()).await?;
            let rows: Vec<Row> = conn.exec(&stmt, params).await?;
            build_result_stream(stmt.columns(), &rows)
        })?;
        Ok(Box::new(stream))
    }

    fn execute(&mut self, statement: &NativeStatement) -> Result<Option<u64>, BackendError> {
        let conn = open_conn(&mut self.conn)?;
        let params = convert(statement.params());
        self.runtime.block_on(async {
            conn.exec_drop(statement.sql(), params).await?;
            Ok::<_, BackendError>(Some(conn.affected_rows()))
        })
    }

    fn close(&mut self) -> Result<(), BackendError> {
        match self.conn.take() {
            Some(conn) => Ok(self.runtime.block_on(conn.disconnect())?),
            None => Ok(()),
        }
    }
}
