//! Capability traits that application code depends on instead of concrete handles.
//!
//! Each wrapper in this crate implements exactly one of these, and test code can supply its
//! own implementations. Every operation that may block takes a [`Context`]; the futures
//! returned are `Send`, so callers can hold them across `tokio::spawn`.
//!
//! Terminal operations (`Tx::commit`, `Tx::rollback`, `Conn::close`, `Stmt::close`) take
//! `self` by value, so a handle cannot be used after it is finished:
//!
//! ```compile_fail
//! use sql_facade::prelude::*;
//!
//! async fn commit_twice(tx: SqlTx<'static>) -> Result<(), SqlFacadeError> {
//!     tx.commit().await?;
//!     tx.commit().await // use of moved value
//! }
//! ```
//!
//! ```compile_fail
//! use sql_facade::prelude::*;
//!
//! fn close_twice(conn: SqlConn) -> Result<(), SqlFacadeError> {
//!     conn.close()?;
//!     conn.close() // use of moved value
//! }
//! ```

use std::future::Future;

use crate::context::Context;
use crate::error::SqlFacadeError;
use crate::scanner::{Row, Rows};
use crate::types::{Arg, DbStats, QueryResult, TxOptions};

/// Top-level entry point bound to a pool of connections.
pub trait Db: Send + Sync {
    type Conn: Conn;
    type Stmt: Stmt;
    type Tx: Tx;

    /// Check that the database is reachable.
    #[allow(clippy::manual_async_fn)]
    fn ping(&self, ctx: &Context) -> impl Future<Output = Result<(), SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn prepare(
        &self,
        ctx: &Context,
        query: &str,
    ) -> impl Future<Output = Result<Self::Stmt, SqlFacadeError>> + Send;

    /// Start a transaction. `None` means the database's defaults.
    #[allow(clippy::manual_async_fn)]
    fn begin_tx(
        &self,
        ctx: &Context,
        opts: Option<&TxOptions>,
    ) -> impl Future<Output = Result<Self::Tx, SqlFacadeError>> + Send;

    /// Reserve a single connection from the pool.
    #[allow(clippy::manual_async_fn)]
    fn conn(&self, ctx: &Context) -> impl Future<Output = Result<Self::Conn, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn exec(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send;

    /// Fetch at most one row. Errors surface from the returned row's `scan`.
    #[allow(clippy::manual_async_fn)]
    fn query_row(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Row> + Send;

    fn stats(&self) -> DbStats;

    /// Close the pool; outstanding connections are closed as they are released.
    #[allow(clippy::manual_async_fn)]
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// One reserved connection. Same surface as [`Db`], plus `close`.
pub trait Conn: Send {
    type Stmt<'a>: Stmt
    where
        Self: 'a;
    type Tx<'a>: Tx
    where
        Self: 'a;

    #[allow(clippy::manual_async_fn)]
    fn ping(&mut self, ctx: &Context) -> impl Future<Output = Result<(), SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn prepare<'a>(
        &'a mut self,
        ctx: &Context,
        query: &str,
    ) -> impl Future<Output = Result<Self::Stmt<'a>, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn begin_tx<'a>(
        &'a mut self,
        ctx: &Context,
        opts: Option<&TxOptions>,
    ) -> impl Future<Output = Result<Self::Tx<'a>, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn exec(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query_row(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Row> + Send;

    /// Release the connection back to its pool.
    ///
    /// # Errors
    /// Whatever the native release reports.
    fn close(self) -> Result<(), SqlFacadeError>;
}

/// A prepared statement.
pub trait Stmt: Send {
    #[allow(clippy::manual_async_fn)]
    fn exec(
        &mut self,
        ctx: &Context,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query(
        &mut self,
        ctx: &Context,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query_row(&mut self, ctx: &Context, args: &[Arg]) -> impl Future<Output = Row> + Send;

    /// Drop the statement handle.
    ///
    /// sqlx has no statement-close call: the compiled statement stays in the connection's
    /// statement cache and is freed with the connection. Nothing else is released here.
    ///
    /// # Errors
    /// The sqlx wrapper never fails; the `Result` lets other implementations report errors.
    fn close(self) -> Result<(), SqlFacadeError>;
}

/// An open transaction. Dropping it without `commit` rolls it back.
pub trait Tx: Send {
    type Stmt<'a>: Stmt
    where
        Self: 'a;

    #[allow(clippy::manual_async_fn)]
    fn commit(self) -> impl Future<Output = Result<(), SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn rollback(self) -> impl Future<Output = Result<(), SqlFacadeError>> + Send;

    /// Prepare a statement that runs inside this transaction.
    #[allow(clippy::manual_async_fn)]
    fn prepare<'a>(
        &'a mut self,
        ctx: &Context,
        query: &str,
    ) -> impl Future<Output = Result<Self::Stmt<'a>, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn exec(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<QueryResult, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Result<Rows, SqlFacadeError>> + Send;

    #[allow(clippy::manual_async_fn)]
    fn query_row(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> impl Future<Output = Row> + Send;
}
