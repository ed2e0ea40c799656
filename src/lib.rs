//! Context-aware, mockable wrappers over sqlx's `Any` driver.
//!
//! Application code talks to the capability traits [`Db`], [`Conn`], [`Stmt`], [`Tx`] and
//! [`Scanner`] instead of concrete pool, connection, statement and transaction types. The
//! wrappers in this crate ([`SqlDb`], [`SqlConn`], [`SqlStmt`], [`SqlTx`]) forward each call
//! to the matching sqlx call unchanged; tests can substitute their own implementations.
//!
//! Every operation that may block takes a [`Context`] carrying cancellation and an optional
//! deadline.
//!
//! ```rust,no_run
//! use sql_facade::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlFacadeError> {
//! let db = sql_facade::open("sqlite", ":memory:")?;
//! let ctx = Context::new();
//!
//! let mut stmt = db.prepare(&ctx, "SELECT 1").await?;
//! let mut rows = stmt.query(&ctx, &[]).await?;
//! assert!(rows.advance());
//! let (one,): (i64,) = rows.scan()?;
//! assert_eq!(one, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conn;
pub mod context;
pub mod db;
pub mod error;
pub mod prelude;
pub mod scanner;
pub mod stmt;
pub mod traits;
pub mod tx;
pub mod types;

pub use config::{PoolOptions, PoolOptionsBuilder};
pub use conn::SqlConn;
pub use context::Context;
pub use db::{SqlDb, drivers, open, open_db, open_db_with, open_with};
pub use error::SqlFacadeError;
pub use scanner::{Row, Rows, Scanner};
pub use stmt::SqlStmt;
pub use traits::{Conn, Db, Stmt, Tx};
pub use tx::SqlTx;
pub use types::{
    AnyRow, Arg, Connector, DbStats, IsolationLevel, NamedArg, NativeConn, NativePool, NativeStmt,
    NativeTx, NullBool, NullFloat64, NullInt32, NullInt64, NullString, NullTime, QueryResult,
    RawBytes, TIMESTAMP_FORMAT, TxOptions, Value, named,
};

// Each wrapper satisfies its capability trait.
const _: () = {
    fn assert_db<T: Db + Clone>() {}
    fn assert_conn<T: Conn>() {}
    fn assert_stmt<T: Stmt>() {}
    fn assert_tx<T: Tx>() {}
    fn assert_scanner<T: Scanner>() {}

    let _ = assert_db::<SqlDb>;
    let _ = assert_conn::<SqlConn>;
    let _ = assert_stmt::<SqlStmt<'static>>;
    let _ = assert_tx::<SqlTx<'static>>;
    let _ = assert_scanner::<Row>;
    let _ = assert_scanner::<Rows>;
};
