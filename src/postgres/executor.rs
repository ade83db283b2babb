use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

use crate::backend::{Connector, NativeLink, NativeStatement, ResultStream};
use crate::error::BackendError;
use crate::keywords::NativeParams;
use crate::runtime::current_thread_runtime;

use super::config::PostgresOptions;
use super::params::as_refs;
use super::query::build_result_stream;

/// Opens [`PostgresLink`]s over plain TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresConnector;

impl Connector for PostgresConnector {
    fn open(&self, params: &NativeParams) -> Result<Box<dyn NativeLink>, BackendError> {
        let opts = PostgresOptions::from_native(params)?;
        let runtime = current_thread_runtime()?;
        tracing::debug!(host = %opts.host, port = opts.port, "connecting to postgres");
        let (client, connection) = runtime.block_on(opts.to_config().connect(NoTls))?;
        let connection = runtime.spawn(async move {
            if let Err(err) = connection.await {
                tracing::warn!(error = %err, "postgres connection task ended with an error");
            }
        });
        Ok(Box::new(PostgresLink {
            runtime,
            client: Some(client),
            connection: Some(connection),
        }))
    }
}

/// One tokio-postgres client driven by its own runtime.
pub struct PostgresLink {
    runtime: Runtime,
    client: Option<Client>,
    connection: Option<JoinHandle<()>>,
}

impl PostgresLink {
    fn client(&self) -> Result<&Client, BackendError> {
        self.client
            .as_ref()
            .ok_or_else(|| BackendError::Other("PostgreSQL client already closed".into()))
    }

    fn batch(&self, sql: &str) -> Result<(), BackendError> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.batch_execute(sql))?)
    }
}

impl NativeLink for PostgresLink {
    fn begin(&mut self) -> Result<(), BackendError> {
        self.batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.batch("ROLLBACK")
    }

    fn query(
        &mut self,
        statement: &NativeStatement,
    ) -> Result<Box<dyn ResultStream>, BackendError> {
        let client = self.client()?;
        let params = as_refs(statement.params());
        let stream = self.runtime.block_on(async {
            let stmt = client.prepare(statement.sql()).await?;
            let rows = client.query(&stmt, &params).await?;
            build_result_stream(&stmt, &rows)
        })?;
        Ok(Box::new(stream))
    }

    fn execute(&mut self, statement: &NativeStatement) -> Result<Option<u64>, BackendError> {
        let client = self.client()?;
        let params = as_refs(statement.params());
        let affected = self
            .runtime
            .block_on(client.execute(statement.sql(), &params))?;
        Ok(Some(affected))
    }

    fn close(&mut self) -> Result<(), BackendError> {
        // Dropping the last client lets the connection task finish.
        drop(self.client.take());
        if let Some(connection) = self.connection.take() {
            self.runtime
                .block_on(connection)
                .map_err(|e| BackendError::Other(format!("postgres connection task failed: {e}")))?;
        }
        Ok(())
    }
}
