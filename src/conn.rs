use std::fmt;
use std::future::Future;

use sqlx::AnyConnection;
use sqlx::{Connection, Executor};

use crate::context::Context;
use crate::error::SqlFacadeError;
use crate::scanner::{Row, Rows};
use crate::stmt::SqlStmt;
use crate::traits::Conn;
use crate::tx::{Backend, SqlTx, begin_statement};
use crate::types::{Arg, NativeConn, QueryResult, TxOptions, bind_args};

/// One connection reserved from a [`SqlDb`](crate::SqlDb) pool.
///
/// Everything run through a `SqlConn` uses the same session, so session state (temp tables,
/// `SET` variables, attached databases) persists between calls.
pub struct SqlConn {
    conn: NativeConn,
}

impl SqlConn {
    pub(crate) fn new(conn: NativeConn) -> Self {
        Self { conn }
    }

    pub fn native_mut(&mut self) -> &mut NativeConn {
        &mut self.conn
    }

    #[must_use]
    pub fn into_native(self) -> NativeConn {
        self.conn
    }

    /// Close the underlying connection instead of returning it to the pool.
    ///
    /// # Errors
    /// Returns `SqlFacadeError` if `ctx` is done or the driver reports an error while closing.
    pub async fn terminate(self, ctx: &Context) -> Result<(), SqlFacadeError> {
        tracing::debug!("terminating {} connection", self.conn.backend_name());
        ctx.run(self.conn.close()).await
    }
}

impl fmt::Debug for SqlConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlConn")
            .field("backend", &self.conn.backend_name())
            .finish()
    }
}

impl Conn for SqlConn {
    type Stmt<'a>
        = SqlStmt<'a>
    where
        Self: 'a;
    type Tx<'a>
        = SqlTx<'a>
    where
        Self: 'a;

    #[allow(clippy::manual_async_fn)]
    fn ping(&mut self, ctx: &Context) -> impl Future<Output = Result<(), SqlFacadeError>> + Send {
        async move { ctx.run(self.conn.ping()).await }
    }

    #[allow(clippy::manual_async_fn)]
    fn prepare<'a>(
        &'a mut self,
        ctx: &Context,
        query: &str,
    ) -> impl Future<Output = Result<SqlStmt<'a>, SqlFacadeError>> + Send {
        async move {
            let statement = ctx.run(Executor::prepare(&mut *self.conn, query)).await?;
            let statement = sqlx::Statement::to_owned(&statement);
            Ok(SqlStmt::on_conn(statement, &mut *self.conn))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn begin_tx<'a>(
        &'a mut self,
        ctx: &Context,
        opts: Option<&TxOptions>,
    ) -> impl Future<Output = Result<SqlTx<'a>, SqlFacadeError>> + Send {
        async move {
            let backend = Backend::from_name(self.conn.backend_name());
            let conn: &'a mut AnyConnection = &mut self.conn;
            let tx = ctx
                .run(async move {
                    match begin_statement(backend, opts)? {
                        Some(statement) => conn.begin_with(statement).await,
                        None => conn.begin().await,
                    }
                })
                .await?;
            tracing::debug!("began {backend:?} transaction on reserved connection");
            Ok(SqlTx::new(tx))
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
            ctx.run(query.execute(&mut *self.conn)).await
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
            let rows = ctx.run(query.fetch_all(&mut *self.conn)).await?;
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
            Row::from_result(ctx.run(query.fetch_one(&mut *self.conn)).await)
        }
    }

    fn close(self) -> Result<(), SqlFacadeError> {
        tracing::debug!("releasing {} connection to pool", self.conn.backend_name());
        drop(self.conn);
        Ok(())
    }
}
