use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{Connector, NativeLink};
use crate::cursor::Cursor;
use crate::error::DbApiError;
use crate::keywords::NativeParams;

/// The transaction a connection is currently inside.
///
/// Replaced wholesale on every commit and rollback; ids increase monotonically per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    id: u64,
}

impl Transaction {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// State shared between a connection and its cursors.
///
/// `link` and `transaction` are either both present (open) or both absent (closed).
pub(crate) struct Session {
    link: Option<Box<dyn NativeLink>>,
    transaction: Option<Transaction>,
    next_transaction_id: u64,
}

impl Session {
    /// The open link and the id of the active transaction.
    pub(crate) fn active(&mut self) -> Option<(&mut Box<dyn NativeLink>, u64)> {
        match (self.link.as_mut(), self.transaction) {
            (Some(link), Some(tx)) => Some((link, tx.id)),
            _ => None,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.link.is_some()
    }

    fn begin(&mut self) -> Result<(), DbApiError> {
        let link = self.link.as_mut().ok_or_else(closed_transaction_error)?;
        link.begin()
            .map_err(|e| DbApiError::transaction("failed to begin transaction", e))?;
        self.next_transaction_id += 1;
        let tx = Transaction {
            id: self.next_transaction_id,
        };
        tracing::debug!(transaction_id = tx.id, "transaction started");
        self.transaction = Some(tx);
        Ok(())
    }
}

pub(crate) type SharedSession = Arc<Mutex<Session>>;

pub(crate) fn lock_session(session: &SharedSession) -> MutexGuard<'_, Session> {
    match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn closed_transaction_error() -> DbApiError {
    DbApiError::Transaction {
        message: "connection is closed".to_string(),
        source: None,
    }
}

/// A physical link to one backend that is always inside exactly one transaction.
///
/// Changes become visible to other connections only after [`Connection::commit`]. Closing
/// (or dropping) the connection rolls back whatever was not committed.
pub struct Connection {
    backend: String,
    session: SharedSession,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.backend)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connection {
    /// Open a physical link through `connector` and begin the first transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::Connection` if the link cannot be opened, or
    /// `DbApiError::Transaction` if the first transaction cannot be started (the link is
    /// closed again in that case).
    pub fn open(
        backend: &str,
        connector: &dyn Connector,
        params: &NativeParams,
    ) -> Result<Self, DbApiError> {
        tracing::debug!(backend, "opening connection");
        let link = connector
            .open(params)
            .map_err(|e| DbApiError::connection(format!("could not open {backend} link"), e))?;

        let mut session = Session {
            link: Some(link),
            transaction: None,
            next_transaction_id: 0,
        };
        if let Err(err) = session.begin() {
            if let Some(mut link) = session.link.take()
                && let Err(close_err) = link.close()
            {
                tracing::warn!(
                    backend,
                    error = %close_err,
                    "failed to close link after BEGIN failed"
                );
            }
            return Err(err);
        }

        Ok(Self {
            backend: backend.to_string(),
            session: Arc::new(Mutex::new(session)),
        })
    }

    /// Identifier of the backend driver behind this connection.
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        !lock_session(&self.session).is_open()
    }

    /// Id of the active transaction, or `None` once closed.
    #[must_use]
    pub fn transaction_id(&self) -> Option<u64> {
        lock_session(&self.session).transaction.map(|tx| tx.id())
    }

    /// Create a cursor. It runs each statement in whichever transaction is active at the time.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::Connection` if the connection is closed.
    pub fn cursor(&self) -> Result<Cursor, DbApiError> {
        if self.is_closed() {
            return Err(DbApiError::Connection {
                message: "connection is closed".to_string(),
                source: None,
            });
        }
        Ok(Cursor::new(Arc::clone(&self.session)))
    }

    /// Commit the current transaction and begin a new one.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::Transaction` if the backend fails to commit or to begin the next
    /// transaction. The connection's transaction state is undefined afterwards; close it.
    pub fn commit(&self) -> Result<(), DbApiError> {
        let mut session = lock_session(&self.session);
        let (link, tx_id) = session.active().ok_or_else(closed_transaction_error)?;
        link.commit().map_err(|e| {
            DbApiError::transaction(format!("commit of transaction {tx_id} failed"), e)
        })?;
        tracing::debug!(transaction_id = tx_id, "transaction committed");
        session.begin()
    }

    /// Roll back the current transaction and begin a new one.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::Transaction` if the backend fails to roll back or to begin the
    /// next transaction. The connection's transaction state is undefined afterwards.
    pub fn rollback(&self) -> Result<(), DbApiError> {
        let mut session = lock_session(&self.session);
        let (link, tx_id) = session.active().ok_or_else(closed_transaction_error)?;
        link.rollback().map_err(|e| {
            DbApiError::transaction(format!("rollback of transaction {tx_id} failed"), e)
        })?;
        tracing::debug!(transaction_id = tx_id, "transaction rolled back");
        session.begin()
    }

    /// Roll back pending work and release the link. Closing an already closed connection
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::Transaction` if the rollback fails or `DbApiError::Connection` if
    /// the link cannot be shut down. The link is released either way.
    pub fn close(&self) -> Result<(), DbApiError> {
        let mut session = lock_session(&self.session);
        let Some(mut link) = session.link.take() else {
            return Ok(());
        };
        let tx = session.transaction.take();
        drop(session);

        let rolled_back = match tx {
            Some(tx) => link.rollback().map_err(|e| {
                let message = format!("rollback of transaction {} on close failed", tx.id());
                DbApiError::transaction(message, e)
            }),
            None => Ok(()),
        };
        let closed = link
            .close()
            .map_err(|e| DbApiError::connection("failed to close link", e));
        tracing::debug!(backend = %self.backend, "connection closed");
        rolled_back.and(closed)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(
                backend = %self.backend,
                error = %err,
                "error closing dropped connection"
            );
        }
    }
}
