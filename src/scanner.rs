//! Row access shared by single-row and row-set results.

use std::fmt;

use sqlx::{Column, FromRow, Row as _};

use crate::error::SqlFacadeError;
use crate::types::AnyRow;

/// Something that can populate a destination from its current row.
///
/// Both [`Row`] and [`Rows`] implement this, so helpers that only need to read one row can be
/// written once against `impl Scanner` and unit-tested with a fake. Destinations are any
/// [`FromRow`] type: tuples such as `(i64, String)` or `#[derive(sqlx::FromRow)]` structs.
///
/// ```rust,no_run
/// use sql_facade::{Scanner, SqlFacadeError};
///
/// fn load_name(row: &mut impl Scanner) -> Result<String, SqlFacadeError> {
///     let (name,): (String,) = row.scan()?;
///     Ok(name)
/// }
/// ```
pub trait Scanner {
    /// Decode the current row into `T`.
    ///
    /// # Errors
    /// Returns the driver's decode error on a type or column-count mismatch, or the error
    /// that produced this row/row-set.
    fn scan<T>(&mut self) -> Result<T, SqlFacadeError>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin + 'static;
}

/// Result of `query_row`: holds the row, or the error that prevented fetching it.
///
/// Errors are reported by [`Scanner::scan`] rather than by `query_row` itself. A query that
/// matched nothing scans as the driver's `RowNotFound`.
#[derive(Default)]
pub struct Row {
    row: Option<AnyRow>,
    err: Option<SqlFacadeError>,
}

impl Row {
    pub(crate) fn from_result(result: Result<AnyRow, SqlFacadeError>) -> Self {
        match result {
            Ok(row) => Self {
                row: Some(row),
                err: None,
            },
            Err(err) => Self {
                row: None,
                err: Some(err),
            },
        }
    }

    /// The deferred error, if fetching the row failed and it has not been scanned yet.
    #[must_use]
    pub fn err(&self) -> Option<&SqlFacadeError> {
        self.err.as_ref()
    }

    /// Hand back the native row.
    ///
    /// # Errors
    /// Returns the deferred error, or `RowNotFound` if there is no row.
    pub fn into_native(self) -> Result<AnyRow, SqlFacadeError> {
        if let Some(err) = self.err {
            return Err(err);
        }
        self.row.ok_or(SqlFacadeError::Driver(sqlx::Error::RowNotFound))
    }
}

// Rows are reported by shape only.
impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("has_row", &self.row.is_some())
            .field("err", &self.err)
            .finish()
    }
}

impl Scanner for Row {
    fn scan<T>(&mut self) -> Result<T, SqlFacadeError>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin + 'static,
    {
        if let Some(err) = self.err.take() {
            return Err(err);
        }
        match &self.row {
            Some(row) => T::from_row(row).map_err(SqlFacadeError::from),
            None => Err(sqlx::Error::RowNotFound.into()),
        }
    }
}

/// Result of `query`: a cursor over the fetched rows.
///
/// Call [`Rows::advance`] before each [`Scanner::scan`].
///
/// ```rust,no_run
/// # use sql_facade::prelude::*;
/// # async fn demo(db: &SqlDb, ctx: &Context) -> Result<(), SqlFacadeError> {
/// let mut rows = db.query(ctx, "SELECT id, name FROM users", &[]).await?;
/// while rows.advance() {
///     let (id, name): (i64, String) = rows.scan()?;
///     println!("{id}: {name}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Rows {
    pending: std::vec::IntoIter<AnyRow>,
    current: Option<AnyRow>,
    columns: Vec<String>,
    total: usize,
}

impl Rows {
    /// Column names are taken from the first row; an empty result reports none.
    pub(crate) fn from_native(rows: Vec<AnyRow>) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self::with_columns(rows, columns)
    }

    pub(crate) fn with_columns(rows: Vec<AnyRow>, columns: Vec<String>) -> Self {
        Self {
            total: rows.len(),
            pending: rows.into_iter(),
            current: None,
            columns,
        }
    }

    /// Move to the next row. Returns `false` once the rows are exhausted.
    pub fn advance(&mut self) -> bool {
        self.current = self.pending.next();
        self.current.is_some()
    }

    /// Column names of the result.
    ///
    /// Rows from [`Stmt::query`](crate::Stmt::query) on [`SqlStmt`](crate::SqlStmt) carry
    /// the prepared statement's columns even when empty. Ad-hoc `query` calls read the
    /// names off the first row, so an empty result reports none; prepare the statement
    /// when column names of an empty result matter.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows the query returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The row `advance` moved to, if any.
    #[must_use]
    pub fn current(&self) -> Option<&AnyRow> {
        self.current.as_ref()
    }

    /// Drop any unread rows. Further calls to `advance` return `false`.
    pub fn close(&mut self) {
        self.current = None;
        self.pending = Vec::new().into_iter();
    }

    /// Remaining unread rows (the current row included), in order.
    #[must_use]
    pub fn into_native(self) -> Vec<AnyRow> {
        self.current.into_iter().chain(self.pending).collect()
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .field("total", &self.total)
            .field("remaining", &self.pending.len())
            .finish()
    }
}

impl Scanner for Rows {
    fn scan<T>(&mut self) -> Result<T, SqlFacadeError>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin + 'static,
    {
        let row = self.current.as_ref().ok_or(SqlFacadeError::NoCurrentRow)?;
        T::from_row(row).map_err(SqlFacadeError::from)
    }
}
