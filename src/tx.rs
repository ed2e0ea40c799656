use std::fmt;
use std::future::Future;

use sqlx::Executor;

use crate::context::Context;
use crate::error::SqlFacadeError;
use crate::scanner::{Row, Rows};
use crate::stmt::SqlStmt;
use crate::traits::Tx;
use crate::types::{Arg, IsolationLevel, NativeTx, QueryResult, TxOptions, bind_args};

/// Wraps a native transaction.
///
/// Obtained from [`Db::begin_tx`](crate::Db::begin_tx) (`SqlTx<'static>`, owning its pooled
/// connection) or [`Conn::begin_tx`](crate::Conn::begin_tx) (borrowing the reserved
/// connection). Dropping an uncommitted transaction rolls it back.
pub struct SqlTx<'c> {
    tx: NativeTx<'c>,
}

impl fmt::Debug for SqlTx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlTx")
            .field("backend", &self.tx.backend_name())
            .finish()
    }
}

impl<'c> SqlTx<'c> {
    pub(crate) fn new(tx: NativeTx<'c>) -> Self {
        Self { tx }
    }

    /// Borrow the native transaction.
    pub fn native_mut(&mut self) -> &mut NativeTx<'c> {
        &mut self.tx
    }

    #[must_use]
    pub fn into_native(self) -> NativeTx<'c> {
        self.tx
    }
}

impl<'c> Tx for SqlTx<'c> {
    type Stmt<'a>
        = SqlStmt<'a>
    where
        Self: 'a;

    #[allow(clippy::manual_async_fn)]
    fn commit(self) -> impl Future<Output = Result<(), SqlFacadeError>> + Send {
        async move {
            self.tx.commit().await?;
            tracing::debug!("transaction committed");
            Ok(())
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn rollback(self) -> impl Future<Output = Result<(), SqlFacadeError>> + Send {
        async move {
            self.tx.rollback().await?;
            tracing::debug!("transaction rolled back");
            Ok(())
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn prepare<'a>(
        &'a mut self,
        ctx: &Context,
        query: &str,
    ) -> impl Future<Output = Result<SqlStmt<'a>, SqlFacadeError>> + Send {
        async move {
            let statement = ctx.run(Executor::prepare(&mut *self.tx, query)).await?;
            let statement = sqlx::Statement::to_owned(&statement);
            Ok(SqlStmt::on_conn(statement, &mut *self.tx))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn exec(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send {
        async move {
            let query = bind_args(sqlx::query(query), args);
            ctx.run(query.execute(&mut *self.tx)).await
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn query(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send {
        async move {
            let query = bind_args(sqlx::query(query), args);
            let rows = ctx.run(query.fetch_all(&mut *self.tx)).await?;
            Ok(Rows::from_native(rows))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn query_row(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Row> + Send {
        async move {
            let query = bind_args(sqlx::query(query), args);
            Row::from_result(ctx.run(query.fetch_one(&mut *self.tx)).await)
        }
    }
}

/// Database family behind a pool or connection, as far as `BEGIN` syntax is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Sqlite,
    Postgres,
    MySql,
    Other,
}

impl Backend {
    /// Accepts URL schemes (`postgresql`) as well as `AnyConnection::backend_name()` (`PostgreSQL`).
    pub(crate) fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" => Backend::Sqlite,
            "postgres" | "postgresql" => Backend::Postgres,
            "mysql" | "mariadb" => Backend::MySql,
            _ => Backend::Other,
        }
    }
}

fn unsupported(backend: Backend, what: &str) -> sqlx::Error {
    sqlx::Error::Configuration(format!("{backend:?} does not support {what}").into())
}

/// The `BEGIN` statement for `opts`, or `None` when the driver's plain `BEGIN` will do.
///
/// # Errors
/// A `Configuration` error when the backend has no syntax for the requested options.
pub(crate) fn begin_statement(
    backend: Backend,
    opts: Option<&TxOptions>,
) -> Result<Option<String>, sqlx::Error> {
    let Some(opts) = opts.filter(|opts| !opts.is_default()) else {
        return Ok(None);
    };
    match backend {
        Backend::Postgres => {
            let mut statement = String::from("BEGIN");
            match opts.isolation {
                IsolationLevel::Default => {}
                IsolationLevel::ReadUncommitted
                | IsolationLevel::ReadCommitted
                | IsolationLevel::RepeatableRead
                | IsolationLevel::Serializable => {
                    statement.push_str(" ISOLATION LEVEL ");
                    statement.push_str(&opts.isolation.to_string().to_ascii_uppercase());
                }
                level => return Err(unsupported(backend, &format!("isolation level {level}"))),
            }
            if opts.read_only {
                statement.push_str(" READ ONLY");
            }
            Ok(Some(statement))
        }
        Backend::MySql => {
            if opts.isolation != IsolationLevel::Default {
                return Err(unsupported(
                    backend,
                    &format!("isolation level {} on BEGIN", opts.isolation),
                ));
            }
            Ok(Some("START TRANSACTION READ ONLY".to_owned()))
        }
        Backend::Sqlite => {
            if opts.read_only {
                return Err(unsupported(backend, "read-only transactions"));
            }
            match opts.isolation {
                IsolationLevel::Serializable => Ok(None),
                level => Err(unsupported(backend, &format!("isolation level {level}"))),
            }
        }
        Backend::Other => Err(unsupported(backend, "transaction options")),
    }
}
