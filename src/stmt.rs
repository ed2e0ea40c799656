use std::fmt;
use std::future::Future;

use sqlx::AnyConnection;
use sqlx::{Column, Statement};

use crate::context::Context;
use crate::error::SqlFacadeError;
use crate::scanner::{Row, Rows};
use crate::traits::Stmt;
use crate::types::{Arg, NativePool, NativeStmt, QueryResult, bind_args};

/// Where a prepared statement runs.
enum Target<'e> {
    /// Any free connection of the pool; sqlx re-prepares per connection as needed.
    Pool(NativePool),
    /// A reserved connection or an open transaction.
    Conn(&'e mut AnyConnection),
}

/// Wraps a native prepared statement together with the executor it was prepared on.
///
/// Statements prepared through [`SqlDb`](crate::SqlDb) are `SqlStmt<'static>`; statements
/// prepared on a connection or transaction borrow it for `'e`.
pub struct SqlStmt<'e> {
    statement: NativeStmt,
    target: Target<'e>,
}

impl<'e> SqlStmt<'e> {
    pub(crate) fn on_pool(statement: NativeStmt, pool: NativePool) -> SqlStmt<'static> {
        SqlStmt {
            statement,
            target: Target::Pool(pool),
        }
    }

    pub(crate) fn on_conn(statement: NativeStmt, conn: &'e mut AnyConnection) -> Self {
        Self {
            statement,
            target: Target::Conn(conn),
        }
    }

    /// The SQL text the statement was prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    /// Names of the columns the statement produces, as reported by the driver at prepare time.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.statement
            .columns()
            .iter()
            .map(|column| column.name().to_owned())
            .collect()
    }

    #[must_use]
    pub fn native(&self) -> &NativeStmt {
        &self.statement
    }
}

impl fmt::Debug for SqlStmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            Target::Pool(_) => "pool",
            Target::Conn(_) => "conn",
        };
        f.debug_struct("SqlStmt")
            .field("sql", &self.sql())
            .field("target", &target)
            .finish()
    }
}

impl Stmt for SqlStmt<'_> {
    #[allow(clippy::manual_async_fn)]
    fn exec(
        &mut self,
        ctx: &Context,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send {
        async move {
            let query = bind_args(self.statement.query(), args);
            match &mut self.target {
                Target::Pool(pool) => ctx.run(query.execute(&*pool)).await,
                Target::Conn(conn) => ctx.run(query.execute(&mut **conn)).await,
            }
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn query(
        &mut self,
        ctx: &Context,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send {
        async move {
            let columns = self.columns();
            let query = bind_args(self.statement.query(), args);
            let rows = match &mut self.target {
                Target::Pool(pool) => ctx.run(query.fetch_all(&*pool)).await?,
                Target::Conn(conn) => ctx.run(query.fetch_all(&mut **conn)).await?,
            };
            if columns.is_empty() {
                Ok(Rows::from_native(rows))
            } else {
                Ok(Rows::with_columns(rows, columns))
            }
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn query_row(&mut self, ctx: &Context, args: &[Arg]) -> impl Future<Output = Row> + Send {
        async move {
            let query = bind_args(self.statement.query(), args);
            let row = match &mut self.target {
                Target::Pool(pool) => ctx.run(query.fetch_one(&*pool)).await,
                Target::Conn(conn) => ctx.run(query.fetch_one(&mut **conn)).await,
            };
            Row::from_result(row)
        }
    }

    /// Drops the handle; the connection's statement cache keeps the compiled statement.
    fn close(self) -> Result<(), SqlFacadeError> {
        tracing::debug!("closing statement: {}", self.sql());
        Ok(())
    }
}
