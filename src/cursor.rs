use std::sync::Arc;

use crate::backend::{NativeStatement, ResultStream};
use crate::connection::{SharedSession, lock_session};
use crate::error::DbApiError;
use crate::materialize::{bind_value, materialize_row};
use crate::reflect::{ColumnDescriptor, reflect_columns};
use crate::results::Row;
use crate::results::row::RowNames;
use crate::types::RowValues;

/// Whether a statement is expected to return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    NonQuery,
}

/// Classify a statement by its first keyword: only text starting with `SELECT` (after leading
/// whitespace, any case) is a query.
///
/// `WITH ...`, `VALUES ...`, procedure calls and multi-statement batches are non-queries here
/// even when they return rows.
#[must_use]
pub fn classify_statement(sql: &str) -> StatementKind {
    let head = sql.trim_start().as_bytes();
    if head.len() >= 6 && head[..6].eq_ignore_ascii_case(b"select") {
        StatementKind::Query
    } else {
        StatementKind::NonQuery
    }
}

enum ResultState {
    /// No result set: nothing executed yet, or the last statement was a non-query.
    Idle,
    Active(Box<dyn ResultStream>),
    /// The query's rows were all read and its stream released.
    Exhausted,
}

/// Runs statements against the active transaction of its connection and hands back rows.
///
/// ```rust
/// # #[cfg(feature = "sqlite")]
/// # fn main() -> Result<(), dbapi_bridge::DbApiError> {
/// use dbapi_bridge::prelude::*;
///
/// let conn = dbapi_bridge::sqlite::connect(&Keywords::new())?;
/// let mut cur = conn.cursor()?;
/// cur.execute("SELECT ? AS answer", &[RowValues::Int(42)])?;
/// let row = cur.fetchone()?.expect("one row");
/// assert_eq!(row.get("answer"), Some(&RowValues::Int(42)));
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "sqlite"))]
/// # fn main() {}
/// ```
pub struct Cursor {
    session: Option<SharedSession>,
    state: ResultState,
    sql: String,
    description: Option<Vec<ColumnDescriptor>>,
    row_names: Arc<RowNames>,
    rowcount: i64,
    arraysize: usize,
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("closed", &self.is_closed())
            .field("description", &self.description)
            .field("rowcount", &self.rowcount)
            .field("arraysize", &self.arraysize)
            .finish_non_exhaustive()
    }
}

impl Cursor {
    pub(crate) fn new(session: SharedSession) -> Self {
        Self {
            session: Some(session),
            state: ResultState::Idle,
            sql: String::new(),
            description: None,
            row_names: Arc::new(RowNames::default()),
            rowcount: -1,
            arraysize: 1,
        }
    }

    /// Column descriptors of the last query, `None` after a non-query.
    #[must_use]
    pub fn description(&self) -> Option<&[ColumnDescriptor]> {
        self.description.as_deref()
    }

    /// Rows affected by the last non-query, or rows fetched so far from the last query.
    /// `-1` when unknown.
    #[must_use]
    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    #[must_use]
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// Set the default batch size of [`Cursor::fetchmany`].
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::CursorState` for a size of zero.
    pub fn set_arraysize(&mut self, arraysize: usize) -> Result<(), DbApiError> {
        if arraysize == 0 {
            return Err(DbApiError::CursorState("arraysize must be at least 1".into()));
        }
        self.arraysize = arraysize;
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    fn session(&self) -> Result<SharedSession, DbApiError> {
        self.session
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| DbApiError::CursorState("cursor is closed".into()))
    }

    fn discard_stream(&mut self) {
        if let ResultState::Active(mut stream) =
            std::mem::replace(&mut self.state, ResultState::Idle)
        {
            stream.close();
        }
    }

    /// Run one statement in the connection's current transaction.
    ///
    /// Any pending result set is released first. `RowValues::Null` parameters are bound as
    /// the backend's NULL.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::CursorState` if the cursor or its connection is closed, or
    /// `DbApiError::StatementExecution` if the backend rejects the statement.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<(), DbApiError> {
        let session = self.session()?;
        self.discard_stream();
        self.description = None;
        self.rowcount = -1;
        sql.clone_into(&mut self.sql);

        let mut guard = lock_session(&session);
        let (link, tx_id) = guard
            .active()
            .ok_or_else(|| DbApiError::CursorState("connection is closed".into()))?;

        let mut statement = NativeStatement::new(sql, tx_id);
        for param in params {
            statement.bind(bind_value(param));
        }

        let kind = classify_statement(sql);
        tracing::debug!(
            ?kind,
            transaction_id = tx_id,
            params = params.len(),
            sql,
            "executing statement"
        );
        match kind {
            StatementKind::Query => {
                let stream = link
                    .query(&statement)
                    .map_err(|e| DbApiError::execution(sql, e))?;
                let description = reflect_columns(stream.as_ref());
                self.row_names = Arc::new(RowNames::new(
                    description.iter().map(|col| col.name.clone()).collect(),
                ));
                self.description = Some(description);
                self.rowcount = 0;
                self.state = ResultState::Active(stream);
            }
            StatementKind::NonQuery => {
                let affected = link
                    .execute(&statement)
                    .map_err(|e| DbApiError::execution(sql, e))?;
                self.rowcount = affected.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
            }
        }
        Ok(())
    }

    /// Run the same statement once per parameter set.
    ///
    /// `rowcount` ends up as the total of the affected-row counts, or `-1` if any run did
    /// not report one.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from [`Cursor::execute`].
    pub fn executemany(
        &mut self,
        sql: &str,
        param_sets: &[Vec<RowValues>],
    ) -> Result<(), DbApiError> {
        self.session()?;
        self.discard_stream();
        let mut total = Some(0_i64);
        for params in param_sets {
            self.execute(sql, params)?;
            total = match total {
                Some(sum) if self.rowcount >= 0 => Some(sum.saturating_add(self.rowcount)),
                _ => None,
            };
        }
        self.discard_stream();
        self.description = None;
        self.rowcount = total.unwrap_or(-1);
        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<Row>, DbApiError> {
        let session = self.session()?;
        let guard = lock_session(&session);
        if !guard.is_open() {
            return Err(DbApiError::CursorState("connection is closed".into()));
        }

        let next = match &mut self.state {
            ResultState::Idle => {
                return Err(DbApiError::CursorState(
                    "no result set; the last statement was not a query".into(),
                ));
            }
            ResultState::Exhausted => return Ok(None),
            ResultState::Active(stream) => stream.next_row(),
        };
        match next {
            Ok(Some(native)) => {
                self.rowcount += 1;
                Ok(Some(Row::new(Arc::clone(&self.row_names), materialize_row(native))))
            }
            Ok(None) => {
                self.discard_stream();
                self.state = ResultState::Exhausted;
                Ok(None)
            }
            Err(err) => {
                self.discard_stream();
                Err(DbApiError::execution(&self.sql, err))
            }
        }
    }

    /// Next row of the current result set, or `None` once it is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `DbApiError::CursorState` if the cursor is closed or no query is active, or
    /// `DbApiError::StatementExecution` if the backend fails while reading.
    pub fn fetchone(&mut self) -> Result<Option<Row>, DbApiError> {
        self.next_row()
    }

    /// Up to `size` rows (`arraysize` when `None`); fewer once the result set runs out.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::fetchone`].
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Row>, DbApiError> {
        let size = size.unwrap_or(self.arraysize);
        let mut rows = Vec::with_capacity(size);
        while rows.len() < size {
            match self.next_row()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// All remaining rows of the current result set.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::fetchone`].
    pub fn fetchall(&mut self) -> Result<Vec<Row>, DbApiError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Iterate over the remaining rows. The iterator ends after the first error.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            cursor: self,
            done: false,
        }
    }

    /// Release any pending result set and detach from the connection.
    pub fn close(&mut self) {
        self.discard_stream();
        self.description = None;
        self.session = None;
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.discard_stream();
    }
}

/// Lazy, non-restartable iterator over a cursor's rows.
pub struct Rows<'c> {
    cursor: &'c mut Cursor,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row, DbApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<'c> IntoIterator for &'c mut Cursor {
    type Item = Result<Row, DbApiError>;
    type IntoIter = Rows<'c>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_prefix_is_a_query() {
        assert_eq!(classify_statement("SELECT 1"), StatementKind::Query);
        assert_eq!(classify_statement("  \n select * from t"), StatementKind::Query);
        assert_eq!(classify_statement("\tSeLeCt\n1"), StatementKind::Query);
    }

    #[test]
    fn everything_else_is_a_non_query() {
        for sql in [
            "INSERT INTO t VALUES (1)",
            "WITH x AS (SELECT 1) SELECT * FROM x",
            "VALUES (1)",
            "sel",
            "",
            "   ",
            "-- comment\nSELECT 1",
        ] {
            assert_eq!(classify_statement(sql), StatementKind::NonQuery, "{sql:?}");
        }
    }

    #[test]
    fn non_ascii_input_does_not_panic() {
        assert_eq!(classify_statement("sélect 1"), StatementKind::NonQuery);
        assert_eq!(classify_statement("ßß"), StatementKind::NonQuery);
    }
}
